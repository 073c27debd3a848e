//! Test doubles for the engine's outer seams.
//!
//! Compiled for unit tests and, with the `harness` feature, for integration
//! tests and downstream crates that want to drive a [`StereoDriver`]
//! headlessly.
//!
//! [`StereoDriver`]: crate::StereoDriver

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use openstereo_atomic::DriverCounters;
use parking_lot::Mutex;

use crate::display::ProjectionBounds;
use crate::feedback::{Cue, UserFeedback};
use crate::host::{DeviceIndex, DevicePose, DeviceProperty, HostDriver, HostGate};

pub use openstereo_input::ScriptedInput;

/// One recorded host call.
///
/// Float values are kept as bits so calls compare exactly. Pose and
/// projection payloads are kept separately, see
/// [`RecordingHost::poses`] and [`RecordingHost::projections`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Pose {
        device: DeviceIndex,
    },
    FloatProperty {
        device: DeviceIndex,
        property: DeviceProperty,
        bits: u32,
    },
    StringProperty {
        device: DeviceIndex,
        property: DeviceProperty,
        value: String,
    },
    BoolProperty {
        device: DeviceIndex,
        property: DeviceProperty,
        value: bool,
    },
    Uint64Property {
        device: DeviceIndex,
        property: DeviceProperty,
        value: u64,
    },
    DisplayProjection {
        device: DeviceIndex,
    },
    LensDistortionChanged {
        device: DeviceIndex,
    },
}

/// [`HostDriver`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    poses: Mutex<Vec<DevicePose>>,
    projections: Mutex<Vec<(ProjectionBounds, ProjectionBounds)>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Number of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| pred(call)).count()
    }

    /// Published poses, in order.
    pub fn poses(&self) -> Vec<DevicePose> {
        self.poses.lock().clone()
    }

    pub fn last_pose(&self) -> Option<DevicePose> {
        self.poses.lock().last().copied()
    }

    /// `(left, right)` frusta pushed via `set_display_projection`.
    pub fn projections(&self) -> Vec<(ProjectionBounds, ProjectionBounds)> {
        self.projections.lock().clone()
    }

    /// Last `UserIpdMeters` value pushed.
    pub fn last_ipd(&self) -> Option<f32> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            HostCall::FloatProperty {
                property: DeviceProperty::UserIpdMeters,
                bits,
                ..
            } => Some(f32::from_bits(*bits)),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
        self.poses.lock().clear();
        self.projections.lock().clear();
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

impl HostDriver for RecordingHost {
    fn publish_pose(&self, device: DeviceIndex, pose: &DevicePose) {
        self.poses.lock().push(*pose);
        self.record(HostCall::Pose { device });
    }

    fn set_float_property(&self, device: DeviceIndex, property: DeviceProperty, value: f32) {
        self.record(HostCall::FloatProperty {
            device,
            property,
            bits: value.to_bits(),
        });
    }

    fn set_string_property(&self, device: DeviceIndex, property: DeviceProperty, value: &str) {
        self.record(HostCall::StringProperty {
            device,
            property,
            value: value.to_owned(),
        });
    }

    fn set_bool_property(&self, device: DeviceIndex, property: DeviceProperty, value: bool) {
        self.record(HostCall::BoolProperty {
            device,
            property,
            value,
        });
    }

    fn set_uint64_property(&self, device: DeviceIndex, property: DeviceProperty, value: u64) {
        self.record(HostCall::Uint64Property {
            device,
            property,
            value,
        });
    }

    fn set_display_projection(
        &self,
        device: DeviceIndex,
        left: &ProjectionBounds,
        right: &ProjectionBounds,
    ) {
        self.projections.lock().push((*left, *right));
        self.record(HostCall::DisplayProjection { device });
    }

    fn lens_distortion_changed(&self, device: DeviceIndex) {
        self.record(HostCall::LensDistortionChanged { device });
    }
}

/// [`UserFeedback`] that records cues and overlay frames.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    cues: Mutex<Vec<Cue>>,
    overlays: Mutex<Vec<String>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().clone()
    }

    /// Every overlay frame, one entry per hotkey tick it was shown.
    pub fn overlays(&self) -> Vec<String> {
        self.overlays.lock().clone()
    }

    pub fn last_overlay(&self) -> Option<String> {
        self.overlays.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.cues.lock().clear();
        self.overlays.lock().clear();
    }
}

impl UserFeedback for RecordingFeedback {
    fn cue(&self, cue: Cue) {
        self.cues.lock().push(cue);
    }

    fn overlay(&self, message: &str) {
        self.overlays.lock().push(message.to_owned());
    }
}

/// A [`HostGate`] already open on device 0, for driving the controller
/// without a running driver.
pub fn open_gate(host: Arc<RecordingHost>, counters: Arc<DriverCounters>) -> Arc<HostGate> {
    let host: Arc<dyn HostDriver> = host;
    let gate = HostGate::new(host, Arc::new(AtomicBool::new(true)), counters);
    gate.set_device(DeviceIndex(0));
    Arc::new(gate)
}
