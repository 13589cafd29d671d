mod display;
mod error;
mod keypad;
mod memory;
mod opcode;
mod stack;
mod timers;

pub use display::{FrameBuffer, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use error::{Error, Result};
pub use keypad::{Keypad, KEY_COUNT};
pub use memory::{Memory, FONT_START, GLYPH_SIZE, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START};
pub use opcode::Opcode;
pub use stack::{Stack, STACK_DEPTH};
pub use timers::Timers;

use rand::prelude::*;

pub const REGISTER_COUNT: usize = 16;
const VF: usize = 0xF;

/// What the host needs to know after a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// The display buffer changed and should be presented.
    pub draw: bool,
    /// The sound timer is running, a tone should be playing.
    pub sound: bool,
    /// The step was an `FX0A` that found no key pressed; PC still points at it.
    pub waiting: bool,
}

type OpcodeFn<R> = fn(&mut Chip8<R>, Opcode) -> Result<()>;

/// The whole machine as one owned value. `R` supplies the bytes for `CXNN`.
#[derive(Clone)]
pub struct Chip8<R = ThreadRng> {
    memory: Memory,
    v: [u8; REGISTER_COUNT], // registers V0-VE (VF is flag for some instructions)
    i: u16,                  // address register
    pc: u16,                 // program counter
    stack: Stack,
    timers: Timers,
    frame: FrameBuffer,
    keypad: Keypad,

    // emulator resources
    loaded: bool,
    draw_flag: bool,
    waiting: bool,
    rng: R,
    opcode_fns: [OpcodeFn<R>; 16],
}

impl Chip8<ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for Chip8<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Chip8<R> {
    pub fn with_rng(rng: R) -> Self {
        let mut vm = Self {
            memory: Memory::new(),
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            stack: Stack::new(),
            timers: Timers::default(),
            frame: FrameBuffer::new(),
            keypad: Keypad::default(),

            loaded: false,
            draw_flag: false,
            waiting: false,
            rng,
            opcode_fns: [
                Self::cls_ret, // 00**
                Self::jmp,     // 1NNN
                Self::call,    // 2NNN
                Self::eb,      // 3XNN
                Self::neb,     // 4XNN
                Self::er,      // 5XY0
                Self::ld,      // 6XNN
                Self::addb,    // 7XNN
                Self::alu,     // 8XY*
                Self::ner,     // 9XY0
                Self::si,      // ANNN
                Self::jmpo,    // BNNN
                Self::rng,     // CXNN
                Self::draw,    // DXYN
                Self::key,     // EX**
                Self::ex,      // FX**
            ],
        };
        vm.initialize();
        vm
    }

    /// Back to power-on state: everything zeroed, font loaded, PC at 0x200
    /// and no program. The random source is kept.
    pub fn initialize(&mut self) {
        self.memory = Memory::new();
        // CHIP-8 systems had the interpreter in the first 512 bytes of memory
        // since we're emulating that we can just store the fontset there
        self.memory.load_font();
        self.v = [0; REGISTER_COUNT];
        self.i = 0;
        self.pc = PROGRAM_START;
        self.stack = Stack::new();
        self.timers = Timers::default();
        self.frame.clear();
        self.keypad = Keypad::default();
        self.loaded = false;
        self.draw_flag = false;
        self.waiting = false;
        log::debug!("initialized");
    }

    /// Copies a raw program image to 0x200. Allowed once per initialization.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if self.loaded {
            return Err(Error::AlreadyLoaded);
        }
        self.memory.load_program(program)?;
        self.loaded = true;
        log::debug!("loaded {} byte program at {:#05X}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Runs one fetch-decode-execute cycle, then ticks both timers.
    ///
    /// On error nothing has changed: PC still points at the offending
    /// instruction and the timers have not ticked. Use
    /// [`skip_instruction`](Self::skip_instruction) to step over it.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if !self.loaded {
            return Err(Error::NoProgram);
        }

        let pc = self.pc;
        // two-byte opcodes
        let opcode = Opcode(self.memory.read_word(pc)?);

        log::trace!(
            "{:03X}: {:?} V={:02X?} I={:03X} stack={:03X?}",
            pc,
            opcode,
            self.v,
            self.i,
            self.stack.frames()
        );

        self.draw_flag = false;
        self.waiting = false;
        self.pc = pc + 2;

        let f = self.opcode_fns[opcode.group()];
        if let Err(err) = f(self, opcode) {
            self.pc = pc;
            log::debug!("fault at {:03X} executing {:?}: {}", pc, opcode, err);
            return Err(err);
        }

        self.timers.tick();

        Ok(StepOutcome {
            draw: self.draw_flag,
            sound: self.timers.sound_active(),
            waiting: self.waiting,
        })
    }

    /// Moves PC past the current instruction without executing it and ticks
    /// the timers, as if the step had completed.
    pub fn skip_instruction(&mut self) {
        log::debug!("skipping instruction at {:03X}", self.pc);
        self.pc = self.pc.wrapping_add(2);
        self.timers.tick();
    }

    pub fn set_key(&mut self, index: usize, pressed: bool) -> Result<()> {
        self.keypad.set_key(index, pressed)
    }

    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.keypad.set_all(keys);
    }

    pub fn display_snapshot(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.waiting
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.v
    }

    /// Register `Vx`, or `None` past VF.
    pub fn v(&self, x: usize) -> Option<u8> {
        self.v.get(x).copied()
    }

    pub fn sp(&self) -> usize {
        self.stack.sp()
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    fn cls_ret(&mut self, opcode: Opcode) -> Result<()> {
        match opcode.0 {
            0x00E0 => {
                // 00E0
                // clear screen
                self.frame.clear();
                self.draw_flag = true;
            }
            0x00EE => {
                // 00EE
                // return from subroutine
                self.pc = self.stack.pop()?;
            }
            0x0000 => {
                // 0000
                // no-op
            }
            _ => return Err(Error::Decode(opcode.0)),
        }
        Ok(())
    }

    fn jmp(&mut self, opcode: Opcode) -> Result<()> {
        // 1NNN
        // jump to NNN
        self.pc = opcode.nnn();
        Ok(())
    }

    fn call(&mut self, opcode: Opcode) -> Result<()> {
        // 2NNN
        // call subroutine at NNN, PC already points past the call
        self.stack.push(self.pc)?;
        self.pc = opcode.nnn();
        Ok(())
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc += 2;
        }
    }

    fn eb(&mut self, opcode: Opcode) -> Result<()> {
        // 3XNN
        // skip if VX == NN
        self.skip_if(self.v[opcode.x()] == opcode.kk());
        Ok(())
    }

    fn neb(&mut self, opcode: Opcode) -> Result<()> {
        // 4XNN
        // skip if VX != NN
        self.skip_if(self.v[opcode.x()] != opcode.kk());
        Ok(())
    }

    fn er(&mut self, opcode: Opcode) -> Result<()> {
        // 5XY0
        // skip if VX == VY
        self.skip_if(self.v[opcode.x()] == self.v[opcode.y()]);
        Ok(())
    }

    fn ld(&mut self, opcode: Opcode) -> Result<()> {
        // 6XNN
        // set VX to NN
        self.v[opcode.x()] = opcode.kk();
        Ok(())
    }

    fn addb(&mut self, opcode: Opcode) -> Result<()> {
        // 7XNN
        // add NN to VX (no carry)
        let x = opcode.x();
        self.v[x] = self.v[x].wrapping_add(opcode.kk());
        Ok(())
    }

    fn alu(&mut self, opcode: Opcode) -> Result<()> {
        let x = opcode.x();
        let (vx, vy) = (self.v[x], self.v[opcode.y()]);
        // flagged ops write VF first, so with X == F the result wins
        let (result, flag) = match opcode.n() {
            // 8XY0
            // set VX to VY
            0x0 => (vy, None),
            // 8XY1
            // set VX to VX OR VY
            0x1 => (vx | vy, None),
            // 8XY2
            // set VX to VX AND VY
            0x2 => (vx & vy, None),
            // 8XY3
            // set VX to VX XOR VY
            0x3 => (vx ^ vy, None),
            0x4 => {
                // 8XY4
                // add VY to VX (set VF = 1 if there's a carry)
                let (sum, carry) = vx.overflowing_add(vy);
                (sum, Some(carry as u8))
            }
            // 8XY5
            // sub VY from VX (set VF = 1 if VX > VY)
            0x5 => (vx.wrapping_sub(vy), Some((vx > vy) as u8)),
            // 8XY6
            // store the LSB of VX in VF and shift VX one to the right
            0x6 => (vx >> 1, Some(vx & 0x1)),
            // 8XY7
            // set VX to VY - VX (set VF = 1 if VY > VX)
            0x7 => (vy.wrapping_sub(vx), Some((vy > vx) as u8)),
            // 8XYE
            // store the MSB of VX in VF and shift VX one to the left
            0xE => (vx << 1, Some(vx >> 7)),
            _ => return Err(Error::Decode(opcode.0)),
        };
        if let Some(flag) = flag {
            self.v[VF] = flag;
        }
        self.v[x] = result;
        Ok(())
    }

    fn ner(&mut self, opcode: Opcode) -> Result<()> {
        // 9XY0
        // skip if VX != VY
        self.skip_if(self.v[opcode.x()] != self.v[opcode.y()]);
        Ok(())
    }

    fn si(&mut self, opcode: Opcode) -> Result<()> {
        // ANNN
        // set I to NNN
        self.i = opcode.nnn();
        Ok(())
    }

    fn jmpo(&mut self, opcode: Opcode) -> Result<()> {
        // BNNN
        // jump to NNN + V0
        self.pc = opcode.nnn() + self.v[0] as u16;
        Ok(())
    }

    fn rng(&mut self, opcode: Opcode) -> Result<()> {
        // CXNN
        // Set VX = RNG[0, 256) & NN
        self.v[opcode.x()] = self.rng.gen::<u8>() & opcode.kk();
        Ok(())
    }

    fn draw(&mut self, opcode: Opcode) -> Result<()> {
        // DXYN
        // draw a sprite at VX,VY with a width of 8 pixels and a height of N pixels
        // each row of 8 pixels is bit-coded in memory starting at I
        // currently drawn pixels are XORd with pixels in memory
        // VF is set to 1 if any currently drawn pixels are unset during this
        let vx = self.v[opcode.x()];
        let vy = self.v[opcode.y()];
        let sprite = self.memory.slice(self.i, opcode.n() as usize)?;

        let collision = self.frame.draw_sprite(vx, vy, sprite);
        self.v[VF] = collision as u8;
        self.draw_flag = true;
        Ok(())
    }

    fn key(&mut self, opcode: Opcode) -> Result<()> {
        let pressed = self.keypad.is_pressed(self.v[opcode.x()]);
        match opcode.kk() {
            // EX9E
            // skip if key stored in VX is pressed
            0x9E => self.skip_if(pressed),
            // EXA1
            // skip if key stored in VX isn't pressed
            0xA1 => self.skip_if(!pressed),
            _ => return Err(Error::Decode(opcode.0)),
        }
        Ok(())
    }

    fn ex(&mut self, opcode: Opcode) -> Result<()> {
        let x = opcode.x();
        match opcode.kk() {
            0x07 => {
                // FX07
                // set VX to delay timer
                self.v[x] = self.timers.delay;
            }
            0x0A => {
                // FX0A
                // store next key press in VX
                // without a pressed key, stay on this instruction and let the host poll again
                // with several keys held, the highest index wins
                match self.keypad.last_pressed() {
                    Some(key) => self.v[x] = key,
                    None => {
                        self.pc -= 2;
                        self.waiting = true;
                    }
                }
            }
            0x15 => {
                // FX15
                // set delay timer to VX
                self.timers.delay = self.v[x];
            }
            0x18 => {
                // FX18
                // set sound timer to VX
                self.timers.sound = self.v[x];
            }
            0x1E => {
                // FX1E
                // add VX to I
                self.i = self.i.wrapping_add(self.v[x] as u16);
            }
            0x29 => {
                // FX29
                // set I to location in memory of sprite for character in VX
                self.i = FONT_START + GLYPH_SIZE * self.v[x] as u16;
            }
            0x33 => {
                // FX33
                // store the BCD representation of VX at I
                // so 193 becomes [1, 9, 3] in memory at I
                let vx = self.v[x];
                let digits = self.memory.slice_mut(self.i, 3)?;
                digits[0] = vx / 100;
                digits[1] = (vx / 10) % 10;
                digits[2] = vx % 10;
            }
            0x55 => {
                // FX55
                // store V0 to VX (inclusive) in memory at I
                self.memory
                    .slice_mut(self.i, x + 1)?
                    .copy_from_slice(&self.v[..=x]);
            }
            0x65 => {
                // FX65
                // fill V0 to VX (inclusive) from memory at I
                let bytes = self.memory.slice(self.i, x + 1)?;
                self.v[..=x].copy_from_slice(bytes);
            }
            _ => return Err(Error::Decode(opcode.0)),
        }
        Ok(())
    }
}
