use super::error::{Error, Result};

pub const STACK_DEPTH: usize = 16;

/// Return addresses for `2nnn`/`00EE`. `sp` is the number of occupied slots.
#[derive(Clone, Default)]
pub struct Stack {
    slots: [u16; STACK_DEPTH],
    sp: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.sp == STACK_DEPTH {
            return Err(Error::StackOverflow);
        }
        self.slots[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.is_empty() {
            return Err(Error::StackUnderflow);
        }
        self.sp -= 1;
        let addr = self.slots[self.sp];
        self.slots[self.sp] = 0;
        Ok(addr)
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    /// Occupied slots, oldest call first.
    pub fn frames(&self) -> &[u16] {
        &self.slots[..self.sp]
    }
}
