//! The host runtime as seen from the driver.
//!
//! [`HostDriver`] is everything the engine needs from the VR runtime. All
//! engine code reaches it through [`HostGate`], which refuses calls once the
//! device has been deactivated.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use glam::{Quat, Vec3};
use openstereo_atomic::DriverCounters;
use openstereo_profile::StereoConfig;
use tracing::trace;

use crate::display::ProjectionBounds;

/// Index the host assigned to the device on activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIndex(pub u32);

impl DeviceIndex {
    /// No device.
    pub const INVALID: Self = Self(u32::MAX);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl std::fmt::Display for DeviceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pose sample in driver space.
///
/// Angular rates are `[pitch, yaw, roll]` in radians per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePose {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub rotation: Quat,
    pub angular_velocity: Vec3,
    pub angular_acceleration: Vec3,
    pub pose_is_valid: bool,
    pub device_is_connected: bool,
}

impl Default for DevicePose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            angular_acceleration: Vec3::ZERO,
            pose_is_valid: false,
            device_is_connected: false,
        }
    }
}

/// Device properties the driver sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceProperty {
    ModelNumber,
    SerialNumber,
    ManufacturerName,
    TrackingFirmwareVersion,
    HardwareRevision,
    UserIpdMeters,
    UserHeadToEyeDepthMeters,
    DisplayFrequency,
    SecondsFromVsyncToPhotons,
    SecondsFromPhotonsToVblank,
    ReportsTimeSinceVSync,
    IsOnDesktop,
    DisplayDebugMode,
    HasDriverDirectModeComponent,
    WillDriftInYaw,
    DeviceIsWireless,
    CurrentUniverseId,
}

/// Calls into the host runtime.
pub trait HostDriver: Send + Sync {
    fn publish_pose(&self, device: DeviceIndex, pose: &DevicePose);

    fn set_float_property(&self, device: DeviceIndex, property: DeviceProperty, value: f32);

    fn set_string_property(&self, device: DeviceIndex, property: DeviceProperty, value: &str);

    fn set_bool_property(&self, device: DeviceIndex, property: DeviceProperty, value: bool);

    fn set_uint64_property(&self, device: DeviceIndex, property: DeviceProperty, value: u64);

    /// Replace both eye frusta.
    fn set_display_projection(
        &self,
        device: DeviceIndex,
        left: &ProjectionBounds,
        right: &ProjectionBounds,
    );

    /// Tell the compositor the distortion/projection changed.
    fn lens_distortion_changed(&self, device: DeviceIndex);
}

/// Identity strings reported on activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub model_number: String,
    pub serial_number: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            model_number: "OpenStereo".to_owned(),
            serial_number: "OPENSTEREO-0001".to_owned(),
        }
    }
}

/// [`HostDriver`] behind the driver's active flag.
///
/// Every call re-checks the flag and the device index immediately before
/// reaching the host. A refused call is counted, never queued.
pub struct HostGate {
    host: Arc<dyn HostDriver>,
    active: Arc<AtomicBool>,
    device: AtomicU32,
    counters: Arc<DriverCounters>,
}

impl std::fmt::Debug for HostGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostGate")
            .field("active", &self.active.load(Ordering::Relaxed))
            .field("device", &self.device())
            .finish_non_exhaustive()
    }
}

impl HostGate {
    pub fn new(
        host: Arc<dyn HostDriver>,
        active: Arc<AtomicBool>,
        counters: Arc<DriverCounters>,
    ) -> Self {
        Self {
            host,
            active,
            device: AtomicU32::new(DeviceIndex::INVALID.0),
            counters,
        }
    }

    /// Device the gate forwards to.
    pub fn device(&self) -> DeviceIndex {
        DeviceIndex(self.device.load(Ordering::Acquire))
    }

    pub(crate) fn set_device(&self, device: DeviceIndex) {
        self.device.store(device.0, Ordering::Release);
    }

    /// Whether a call made now would reach the host.
    pub fn is_open(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.device().is_valid()
    }

    fn with_host(&self, what: &'static str, call: impl FnOnce(&dyn HostDriver, DeviceIndex)) -> bool {
        let device = self.device();
        if !self.active.load(Ordering::Acquire) || !device.is_valid() {
            trace!(call = what, "Host call suppressed, device inactive");
            self.counters.inc_host_call_suppressed();
            return false;
        }
        call(self.host.as_ref(), device);
        true
    }

    pub fn publish_pose(&self, pose: &DevicePose) -> bool {
        self.with_host("publish_pose", |host, device| host.publish_pose(device, pose))
    }

    pub fn set_float_property(&self, property: DeviceProperty, value: f32) -> bool {
        self.with_host("set_float_property", |host, device| {
            host.set_float_property(device, property, value);
        })
    }

    pub fn set_string_property(&self, property: DeviceProperty, value: &str) -> bool {
        self.with_host("set_string_property", |host, device| {
            host.set_string_property(device, property, value);
        })
    }

    pub fn set_bool_property(&self, property: DeviceProperty, value: bool) -> bool {
        self.with_host("set_bool_property", |host, device| {
            host.set_bool_property(device, property, value);
        })
    }

    pub fn set_uint64_property(&self, property: DeviceProperty, value: u64) -> bool {
        self.with_host("set_uint64_property", |host, device| {
            host.set_uint64_property(device, property, value);
        })
    }

    pub fn set_display_projection(&self, left: &ProjectionBounds, right: &ProjectionBounds) -> bool {
        self.with_host("set_display_projection", |host, device| {
            host.set_display_projection(device, left, right);
        })
    }

    pub fn lens_distortion_changed(&self) -> bool {
        self.with_host("lens_distortion_changed", |host, device| {
            host.lens_distortion_changed(device);
        })
    }

    /// Static and config-derived properties set once on activation.
    pub fn push_activation_properties(&self, identity: &DeviceIdentity, config: &StereoConfig) {
        use DeviceProperty as P;

        self.set_string_property(P::ModelNumber, &identity.model_number);
        self.set_string_property(P::SerialNumber, &identity.serial_number);
        self.set_string_property(P::ManufacturerName, "OpenStereo");
        self.set_string_property(P::TrackingFirmwareVersion, "1.0");
        self.set_string_property(P::HardwareRevision, "1.0");

        self.set_float_property(P::UserIpdMeters, config.depth);
        self.set_float_property(P::UserHeadToEyeDepthMeters, 0.0);
        self.set_float_property(P::DisplayFrequency, config.display_frequency);
        self.set_float_property(P::SecondsFromVsyncToPhotons, config.display_latency);
        self.set_float_property(P::SecondsFromPhotonsToVblank, 0.0);

        self.set_bool_property(P::ReportsTimeSinceVSync, false);
        // extended-mode HMD whose window the host places itself
        self.set_bool_property(P::IsOnDesktop, false);
        self.set_bool_property(P::DisplayDebugMode, true);
        self.set_bool_property(P::HasDriverDirectModeComponent, false);
        self.set_bool_property(P::WillDriftInYaw, false);
        self.set_bool_property(P::DeviceIsWireless, false);

        self.set_uint64_property(P::CurrentUniverseId, 64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{HostCall, RecordingHost};

    fn gate(host: &Arc<RecordingHost>) -> (HostGate, Arc<AtomicBool>, Arc<DriverCounters>) {
        let active = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(DriverCounters::new());
        let host_dyn: Arc<dyn HostDriver> = Arc::clone(host) as Arc<dyn HostDriver>;
        let gate = HostGate::new(host_dyn, Arc::clone(&active), Arc::clone(&counters));
        (gate, active, counters)
    }

    #[test]
    fn closed_gate_suppresses_and_counts() {
        let host = Arc::new(RecordingHost::new());
        let (gate, active, counters) = gate(&host);

        assert!(!gate.lens_distortion_changed());
        active.store(true, Ordering::Release);
        assert!(!gate.lens_distortion_changed(), "no device index yet");

        assert_eq!(counters.host_calls_suppressed(), 2);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn open_gate_forwards_with_device_index() {
        let host = Arc::new(RecordingHost::new());
        let (gate, active, _counters) = gate(&host);
        gate.set_device(DeviceIndex(3));
        active.store(true, Ordering::Release);

        assert!(gate.set_float_property(DeviceProperty::UserIpdMeters, 0.25));
        assert_eq!(
            host.calls(),
            vec![HostCall::FloatProperty {
                device: DeviceIndex(3),
                property: DeviceProperty::UserIpdMeters,
                bits: 0.25_f32.to_bits(),
            }]
        );
    }

    #[test]
    fn activation_properties_report_desktop_display() {
        let host = Arc::new(RecordingHost::new());
        let (gate, active, _counters) = gate(&host);
        gate.set_device(DeviceIndex(0));
        active.store(true, Ordering::Release);

        gate.push_activation_properties(&DeviceIdentity::default(), &StereoConfig::default());
        let calls = host.calls();
        assert!(calls.contains(&HostCall::BoolProperty {
            device: DeviceIndex(0),
            property: DeviceProperty::IsOnDesktop,
            value: false,
        }));
        assert!(calls.contains(&HostCall::BoolProperty {
            device: DeviceIndex(0),
            property: DeviceProperty::DisplayDebugMode,
            value: true,
        }));
        assert!(calls.contains(&HostCall::FloatProperty {
            device: DeviceIndex(0),
            property: DeviceProperty::UserIpdMeters,
            bits: 0.4_f32.to_bits(),
        }));
    }
}
