/// Delay and sound counters. Both count down once per tick and stop at zero.
///
/// Ticking happens once per executed instruction, so the decay rate follows
/// however fast the host steps the VM rather than a fixed 60Hz.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// The tone should be playing while the sound timer is nonzero.
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}
