//! Input backends.
//!
//! The driver polls keyboard and gamepad state through an [`InputBackend`]
//! chosen once at startup. Platform backends live with the binary;
//! [`NullInput`] and [`ScriptedInput`] are enough for headless runs and tests.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::binding::KeyBinding;
use crate::gamepad::GamepadState;
use crate::keys::VirtualKey;

/// Source of raw keyboard and gamepad state.
pub trait InputBackend: Send + Sync {
    /// Current state of the first connected gamepad, or `None` if there is none.
    fn gamepad(&self) -> Option<GamepadState>;

    /// Whether `key` is held right now.
    fn is_key_down(&self, key: VirtualKey) -> bool;
}

/// Input for one tick.
///
/// The gamepad is read once on capture; keyboard queries go to the backend.
#[derive(Clone, Copy)]
pub struct InputFrame<'a> {
    backend: &'a dyn InputBackend,
    gamepad: Option<GamepadState>,
}

impl<'a> InputFrame<'a> {
    /// Poll the gamepad and wrap the backend.
    pub fn capture(backend: &'a dyn InputBackend) -> Self {
        Self {
            backend,
            gamepad: backend.gamepad(),
        }
    }

    /// Gamepad sample taken at capture.
    pub fn gamepad(&self) -> Option<GamepadState> {
        self.gamepad
    }

    /// Keyboard query.
    pub fn is_key_down(&self, key: VirtualKey) -> bool {
        self.backend.is_key_down(key)
    }

    /// Whether `binding` is held.
    pub fn is_pressed(&self, binding: KeyBinding) -> bool {
        binding.is_pressed(self)
    }
}

impl std::fmt::Debug for InputFrame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputFrame")
            .field("gamepad", &self.gamepad)
            .finish_non_exhaustive()
    }
}

/// No keyboard, no gamepad.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInput;

impl InputBackend for NullInput {
    fn gamepad(&self) -> Option<GamepadState> {
        None
    }

    fn is_key_down(&self, _key: VirtualKey) -> bool {
        false
    }
}

/// Backend whose state is set by hand.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    gamepad: RwLock<Option<GamepadState>>,
    keys: RwLock<HashSet<VirtualKey>>,
}

impl ScriptedInput {
    /// No keys held, no gamepad.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the gamepad sample.
    pub fn set_gamepad(&self, state: Option<GamepadState>) {
        *self.gamepad.write() = state;
    }

    /// Set the right stick, connecting a gamepad if none is present.
    pub fn set_right_stick(&self, x: i16, y: i16) {
        let mut pad = self.gamepad.write();
        let state = pad.get_or_insert_with(GamepadState::default);
        state.thumb_rx = x;
        state.thumb_ry = y;
    }

    /// Set the digital buttons, connecting a gamepad if none is present.
    pub fn set_buttons(&self, buttons: u16) {
        let mut pad = self.gamepad.write();
        pad.get_or_insert_with(GamepadState::default).buttons = buttons;
    }

    /// Hold `key`.
    pub fn press(&self, key: VirtualKey) {
        self.keys.write().insert(key);
    }

    /// Release `key`.
    pub fn release(&self, key: VirtualKey) {
        self.keys.write().remove(&key);
    }

    /// Release every key and button.
    pub fn release_all(&self) {
        self.keys.write().clear();
        if let Some(pad) = self.gamepad.write().as_mut() {
            pad.buttons = 0;
            pad.left_trigger = 0;
            pad.right_trigger = 0;
        }
    }
}

impl InputBackend for ScriptedInput {
    fn gamepad(&self) -> Option<GamepadState> {
        *self.gamepad.read()
    }

    fn is_key_down(&self, key: VirtualKey) -> bool {
        self.keys.read().contains(&key)
    }
}
