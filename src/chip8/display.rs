use std::fmt;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Monochrome 64x32 pixel grid, row-major (`x + y * 64`).
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT],
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [false; DISPLAY_WIDTH * DISPLAY_HEIGHT];
    }

    /// XORs an 8-pixel-wide sprite onto the grid with its top left corner at
    /// `(x, y)`. Each byte of `rows` is one row, most significant bit on the
    /// left. Pixels past the right or bottom edge wrap around.
    ///
    /// Returns true if any pixel was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collision = false;
        for (row, bits) in rows.iter().enumerate() {
            let py = (y as usize + row) % DISPLAY_HEIGHT;
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let px = (x as usize + col) % DISPLAY_WIDTH;
                let pixel = &mut self.pixels[px + py * DISPLAY_WIDTH];
                collision |= *pixel;
                *pixel ^= true;
            }
        }
        collision
    }

    /// Pixel state at `(x, y)`; coordinates outside the grid read as unset.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT && self.pixels[x + y * DISPLAY_WIDTH]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| !*p)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// One line per row, `#` for set pixels and `.` for unset ones.
impl fmt::Display for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.pixels.chunks(DISPLAY_WIDTH) {
            for pixel in row {
                f.write_str(if *pixel { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FrameBuffer")?;
        fmt::Display::fmt(self, f)
    }
}
