use super::error::{Error, Result};

pub const KEY_COUNT: usize = 16;

/// Hex keypad state, written by the host between steps and only read by
/// the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn set_key(&mut self, index: usize, pressed: bool) -> Result<()> {
        let key = self.keys.get_mut(index).ok_or(Error::InvalidKey(index))?;
        *key = pressed;
        Ok(())
    }

    pub fn set_all(&mut self, keys: [bool; KEY_COUNT]) {
        self.keys = keys;
    }

    /// Register values above 0xF name no key, so they are never pressed.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// Highest-indexed key held down, the one `FX0A` reports when several
    /// are pressed.
    pub fn last_pressed(&self) -> Option<u8> {
        self.keys.iter().rposition(|k| *k).map(|i| i as u8)
    }
}
