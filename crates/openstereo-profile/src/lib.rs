//! Configuration model for the OpenStereo driver.
//!
//! [`StereoConfig`] holds every display, stereo, pose and hotkey parameter.
//! It is built from [`load_defaults`] and `default_config.json`, then has the
//! per-application keys ([`document::PROFILE_KEYS`]) swapped when an
//! application profile loads. [`ProfileStore`] reads and writes both.
//!
//! Profiles are JSON documents, one per application, stored as
//! `<app>_config.json` next to a `default_config.json`. Missing fields fall
//! back to the layer below, unknown fields are ignored.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod document;
pub mod sanitize;
pub mod storage;

pub use config::{PresetRuntime, StereoConfig, UserPreset, load_defaults};
pub use storage::ProfileStore;

/// Smallest convergence ever used; it is a divisor in the frustum math.
pub const MIN_CONVERGENCE: f32 = 0.1;

/// Name of the profile every other profile is layered over.
pub const DEFAULT_PROFILE: &str = "default";

/// Suffix appended to a profile name to form its file name.
pub const PROFILE_FILE_SUFFIX: &str = "_config.json";
