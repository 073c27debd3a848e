//! Gamepad snapshot.

use crate::keys::{GamepadButton, TRIGGER_THRESHOLD};

/// One poll of a gamepad, in XInput units.
///
/// Read once per tick so pitch and yaw see the same stick sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadState {
    /// Digital button bits
    pub buttons: u16,
    /// Left trigger, 0..=255
    pub left_trigger: u8,
    /// Right trigger, 0..=255
    pub right_trigger: u8,
    /// Right stick horizontal axis
    pub thumb_rx: i16,
    /// Right stick vertical axis
    pub thumb_ry: i16,
}

impl GamepadState {
    const STICK_MAX: f32 = 32767.0;

    /// Button bits widened to `u32`, with the triggers folded in as
    /// pseudo-buttons once they pass [`TRIGGER_THRESHOLD`].
    pub fn button_mask(&self) -> u32 {
        let mut mask = u32::from(self.buttons);
        if self.left_trigger > TRIGGER_THRESHOLD {
            mask |= GamepadButton::LEFT_TRIGGER;
        }
        if self.right_trigger > TRIGGER_THRESHOLD {
            mask |= GamepadButton::RIGHT_TRIGGER;
        }
        mask
    }

    /// Right stick as `(x, y)` in `[-1, 1]`.
    ///
    /// `i16::MIN` would map slightly past -1, so both axes are clamped.
    pub fn right_stick(&self) -> (f32, f32) {
        let norm = |v: i16| (f32::from(v) / Self::STICK_MAX).clamp(-1.0, 1.0);
        (norm(self.thumb_rx), norm(self.thumb_ry))
    }
}
