//! Tick-counted debounce.

/// Suppresses repeats of a held key for a number of hotkey ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Debounce {
    remaining: u32,
}

impl Debounce {
    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    /// Ticks left before the next press is accepted.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn arm(&mut self, ticks: u32) {
        self.remaining = ticks;
    }

    /// Count down one tick.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// One hotkey tick for a one-shot action: fires (and re-arms) if
    /// `pressed` while ready, otherwise counts down.
    pub fn trigger(&mut self, pressed: bool, ticks: u32) -> bool {
        if pressed && self.is_ready() {
            self.arm(ticks);
            true
        } else {
            self.tick();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn held_key_fires_once_per_window() {
        let mut debounce = Debounce::default();
        let fired: Vec<bool> = (0..7).map(|_| debounce.trigger(true, 3)).collect();
        assert_eq!(fired, [true, false, false, false, true, false, false]);
    }

    #[test]
    fn release_still_counts_down() {
        let mut debounce = Debounce::default();
        assert!(debounce.trigger(true, 2));
        assert!(!debounce.trigger(false, 2));
        assert!(!debounce.trigger(false, 2));
        assert!(debounce.is_ready());
        assert!(debounce.trigger(true, 2));
    }

    #[test]
    fn zero_window_never_suppresses() {
        let mut debounce = Debounce::default();
        assert!(debounce.trigger(true, 0));
        assert!(debounce.trigger(true, 0));
    }

    #[quickcheck]
    fn fires_are_separated_by_the_window(presses: Vec<bool>, window: u8) -> bool {
        let window = u32::from(window % 16);
        let mut debounce = Debounce::default();
        let fired: Vec<usize> = presses
            .iter()
            .enumerate()
            .filter_map(|(tick, &pressed)| debounce.trigger(pressed, window).then_some(tick))
            .collect();
        fired
            .windows(2)
            .all(|pair| pair.last().zip(pair.first()).is_some_and(|(b, a)| b - a > window as usize))
    }
}
