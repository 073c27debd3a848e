//! OpenStereo engine: a synthetic stereo HMD.
//!
//! Turns a flat game window into a side-by-side or top-and-bottom stereo
//! device with adjustable depth and convergence, and synthesizes a head pose
//! from static offsets, gamepad input and optional orientation telemetry.
//!
//! The host runtime is reached through [`HostDriver`], input through
//! [`InputBackend`](openstereo_input::InputBackend), and user feedback
//! through [`UserFeedback`]. [`StereoDriver`] wires everything together.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

pub mod auto_depth;
pub mod controller;
pub mod debounce;
pub mod display;
pub mod driver;
pub mod error;
pub mod feedback;
#[cfg(any(test, feature = "harness"))]
pub mod harness;
pub mod host;
pub mod hotkeys;
pub mod pose;
pub mod presets;
pub mod session;
pub mod shared;

pub use auto_depth::{AutoDepthConfig, AutoDepthServer, parse_depth_prefix};
pub use controller::{OriginAxis, ParameterController};
pub use display::{
    DisplayComponent, DistortionCoordinates, Eye, FrustumGeometry, ProjectionBounds,
    StereoDisplay, ViewportRect, WindowBounds,
};
pub use driver::{DriverOptions, StereoDriver};
pub use error::{DriverError, DriverResult};
pub use feedback::{Cue, NullFeedback, TracingFeedback, UserFeedback};
pub use host::{DeviceIdentity, DeviceIndex, DevicePose, DeviceProperty, HostDriver, HostGate};
pub use hotkeys::HotkeyWorker;
pub use pose::{PoseInputs, PoseSynthesizer, PoseWorker};
pub use presets::{PresetBank, PresetEvent};
pub use session::{ProcessEvent, ProfileNotice, ProfileSession};
pub use shared::LiveConfig;
