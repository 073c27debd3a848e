//! Input side of the OpenStereo driver.
//!
//! Profiles name their keys with human-readable tokens (`"VK_F5"`,
//! `"XINPUT_GAMEPAD_A"`, `"XINPUT_GAMEPAD_LB+XINPUT_GAMEPAD_RB"`). This crate
//! resolves those tokens once at load time into [`KeyBinding`] values, and
//! evaluates them each tick against an [`InputFrame`] captured from an
//! [`InputBackend`].
//!
//! The backend is an explicit strategy object handed to the driver at
//! construction; there is no process-global input state.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod binding;
pub mod deadzone;
pub mod gamepad;
pub mod keys;

pub use backend::{InputBackend, InputFrame, NullInput, ScriptedInput};
pub use binding::{BindType, BoundKey, KeyBinding, resolve_binding, resolve_binding_or_unbound};
pub use deadzone::apply_deadzone;
pub use gamepad::GamepadState;
pub use keys::{GamepadButton, VirtualKey};
