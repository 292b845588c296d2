/// How many counters at and below the highest accepted one the window remembers.
pub const WINDOW_SIZE: u64 = 32;

/// Sliding anti-replay window over received sequence numbers.
///
/// Bit 31 of `bitmap` stands for `highest`, bit 31 - k for `highest - k`.
/// A fresh window has seen nothing, so the very first counter accepted may be zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    highest: u64,
    bitmap: u32,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn highest(&self) -> u64 {
        self.highest
    }
    fn mask(offset: u64) -> u32 {
        1u32 << (WINDOW_SIZE - 1 - offset)
    }
    /// Check the window without mutating state.
    pub fn check(&self, counter: u64) -> bool {
        if counter > self.highest {
            return true;
        }
        let offset = self.highest - counter;
        offset < WINDOW_SIZE && self.bitmap & Self::mask(offset) == 0
    }
    /// Update the window, returning true if the counter was still fresh.
    /// This should only be called after the message is authenticated.
    pub fn update(&mut self, counter: u64) -> bool {
        if counter > self.highest {
            let shift = counter - self.highest;
            self.bitmap = if shift >= WINDOW_SIZE { 0 } else { self.bitmap >> shift };
            self.bitmap |= Self::mask(0);
            self.highest = counter;
            return true;
        }
        if !self.check(counter) {
            return false;
        }
        self.bitmap |= Self::mask(self.highest - counter);
        true
    }
}
