//! Binding tokens.
//!
//! A token is one of:
//! - empty, meaning the key is not bound
//! - a keyboard/mouse name such as `VK_NUMPAD7`
//! - a gamepad button name such as `XINPUT_GAMEPAD_GUIDE`
//! - a `+`-joined chord of gamepad buttons, pressed only when every part is held

use openstereo_errors::BindingError;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::InputFrame;
use crate::keys::{VirtualKey, gamepad_button, virtual_key};

/// How a preset or the control toggle reacts to its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindType {
    /// Apply every tick while the key is down
    Switch,
    /// Flip between the preset and the previous values on each press
    #[default]
    Toggle,
    /// Apply while held, restore on release
    Hold,
}

impl BindType {
    /// Name as written in profile files.
    pub fn as_str(&self) -> &'static str {
        match self {
            BindType::Switch => "switch",
            BindType::Toggle => "toggle",
            BindType::Hold => "hold",
        }
    }
}

/// A resolved binding. Keyboard and gamepad are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyBinding {
    /// Never pressed
    #[default]
    Unbound,
    /// Keyboard or mouse key
    Keyboard(VirtualKey),
    /// Gamepad button mask; every bit must be held
    Gamepad(u32),
}

impl KeyBinding {
    /// Whether the binding is held in `frame`.
    pub fn is_pressed(&self, frame: &InputFrame<'_>) -> bool {
        match *self {
            KeyBinding::Unbound => false,
            KeyBinding::Keyboard(key) => frame.is_key_down(key),
            KeyBinding::Gamepad(mask) => {
                mask != 0
                    && frame
                        .gamepad()
                        .is_some_and(|pad| pad.button_mask() & mask == mask)
            }
        }
    }

    /// Whether this is [`KeyBinding::Unbound`].
    pub fn is_unbound(&self) -> bool {
        matches!(self, KeyBinding::Unbound)
    }
}

/// Resolve a token into a [`KeyBinding`].
///
/// # Errors
///
/// Returns [`BindingError`] when the token, or any part of a chord, is not in
/// the key tables.
pub fn resolve_binding(token: &str) -> Result<KeyBinding, BindingError> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(KeyBinding::Unbound);
    }
    if let Some(key) = virtual_key(token) {
        return Ok(KeyBinding::Keyboard(key));
    }
    if !token.contains('+') {
        return gamepad_button(token)
            .map(KeyBinding::Gamepad)
            .ok_or_else(|| BindingError::unknown_token(token));
    }

    let mut mask = 0u32;
    for part in token.split('+').map(str::trim) {
        let bit = gamepad_button(part)
            .ok_or_else(|| BindingError::unknown_chord_part(token, part))?;
        mask |= bit;
    }
    Ok(KeyBinding::Gamepad(mask))
}

/// Resolve a token, logging and falling back to [`KeyBinding::Unbound`] when
/// it is not recognized.
pub fn resolve_binding_or_unbound(field: &str, token: &str) -> KeyBinding {
    match resolve_binding(token) {
        Ok(binding) => binding,
        Err(e) => {
            warn!(field, token, error = %e, "Unrecognized key binding, leaving it unbound");
            KeyBinding::Unbound
        }
    }
}

/// A binding together with the token it was resolved from.
///
/// Serializes as the bare token so profiles round-trip exactly, including
/// tokens that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BoundKey {
    token: String,
    binding: KeyBinding,
}

impl BoundKey {
    /// Resolve `token`; unknown tokens stay unbound.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let binding = resolve_binding_or_unbound("binding", &token);
        Self { token, binding }
    }

    /// An empty, unbound key.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Token as written in the profile.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Resolved binding.
    pub fn binding(&self) -> KeyBinding {
        self.binding
    }

    /// Shorthand for `self.binding().is_pressed(frame)`.
    pub fn is_pressed(&self, frame: &InputFrame<'_>) -> bool {
        self.binding.is_pressed(frame)
    }
}

impl From<String> for BoundKey {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl From<&str> for BoundKey {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<BoundKey> for String {
    fn from(key: BoundKey) -> Self {
        key.token
    }
}
