use super::error::{Error, Result};

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200; // programs start at 0x200
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const FONT_START: u16 = 0;
pub const GLYPH_SIZE: u16 = 5; // bytes per font glyph

const FONTSET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Flat 4K address space. The first 512 bytes belong to the interpreter,
/// which here only means the hex font; programs live from 0x200 up.
///
/// Every access is bounds checked and reports [`Error::Address`] rather than
/// wrapping.
#[derive(Clone)]
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Zeroed memory without the font.
    pub fn new() -> Self {
        Self {
            bytes: [0; MEMORY_SIZE],
        }
    }

    pub fn load_font(&mut self) {
        let start = FONT_START as usize;
        self.bytes[start..start + FONTSET.len()].copy_from_slice(&FONTSET);
    }

    /// Copies a raw program image to 0x200. Memory is untouched if the image
    /// doesn't fit.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Error::program_too_large(program.len()));
        }
        let start = PROGRAM_START as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    pub fn read_byte(&self, addr: u16) -> Result<u8> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(Error::Address(addr as usize))
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        let cell = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(Error::Address(addr as usize))?;
        *cell = value;
        Ok(())
    }

    /// Big-endian two-byte word at `addr`, i.e. an instruction.
    pub fn read_word(&self, addr: u16) -> Result<u16> {
        let bytes = self.slice(addr, 2)?;
        Ok((bytes[0] as u16) << 8 | bytes[1] as u16)
    }

    /// `len` bytes starting at `addr`. Fails with the first address that
    /// falls outside memory.
    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let range = Self::range(addr, len)?;
        Ok(&self.bytes[range])
    }

    pub fn slice_mut(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let range = Self::range(addr, len)?;
        Ok(&mut self.bytes[range])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn range(addr: u16, len: usize) -> Result<std::ops::Range<usize>> {
        let start = addr as usize;
        let end = start + len;
        if end > MEMORY_SIZE {
            return Err(Error::Address(start.max(MEMORY_SIZE)));
        }
        Ok(start..end)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Memory::new();
        assert!(m.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_font_loaded_at_start() {
        let mut m = Memory::new();
        m.load_font();
        assert_eq!(m.slice(0, 5).unwrap(), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // glyph F is the last one
        assert_eq!(
            m.slice(15 * GLYPH_SIZE, 5).unwrap(),
            &[0xF0, 0x80, 0xF0, 0x80, 0x80]
        );
        assert!(m.as_bytes()[80..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_program_load_ok() {
        let mut m = Memory::new();
        m.load_program(&[0x00, 0xE0]).unwrap();
        assert_eq!(m.slice(0x200, 2).unwrap(), &[0x00, 0xE0]);
        assert_eq!(m.read_word(0x200).unwrap(), 0x00E0);
    }

    #[test]
    fn test_program_fills_memory() {
        let mut m = Memory::new();
        let program = vec![0xAB; MAX_PROGRAM_SIZE];
        m.load_program(&program).unwrap();
        assert_eq!(m.read_byte(0xFFF).unwrap(), 0xAB);
    }

    #[test]
    fn test_program_too_large() {
        let mut m = Memory::new();
        let program = vec![0xAB; MAX_PROGRAM_SIZE + 1];
        assert_eq!(
            m.load_program(&program),
            Err(Error::Size {
                size: 3585,
                max: 3584
            })
        );
        assert!(m.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_read_write_bounds() {
        let mut m = Memory::new();
        m.write_byte(0xFFF, 7).unwrap();
        assert_eq!(m.read_byte(0xFFF), Ok(7));
        assert_eq!(m.read_byte(0x1000), Err(Error::Address(0x1000)));
        assert_eq!(m.write_byte(0x1234, 1), Err(Error::Address(0x1234)));
    }

    #[test]
    fn test_word_straddling_end_faults() {
        let m = Memory::new();
        assert_eq!(m.read_word(0xFFE), Ok(0));
        assert_eq!(m.read_word(0xFFF), Err(Error::Address(0x1000)));
    }

    #[test]
    fn test_slice_mut_writes_through() {
        let mut m = Memory::new();
        m.slice_mut(0x300, 3).unwrap().copy_from_slice(&[1, 5, 7]);
        assert_eq!(m.slice(0x300, 3).unwrap(), &[1, 5, 7]);
        assert!(m.slice_mut(0xFFE, 3).is_err());
    }
}
