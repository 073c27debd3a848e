//! A host runtime that only logs.

use std::sync::atomic::{AtomicU64, Ordering};

use openstereo_engine::{DeviceIndex, DevicePose, DeviceProperty, HostDriver, ProjectionBounds};
use tracing::{debug, info, trace};

/// [`HostDriver`] that writes every call to the log.
///
/// Poses arrive at the display rate and are logged at `trace`; everything
/// else at `info`/`debug`.
#[derive(Debug, Default)]
pub struct LoggingHost {
    poses: AtomicU64,
}

impl LoggingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poses received so far.
    pub fn pose_count(&self) -> u64 {
        self.poses.load(Ordering::Relaxed)
    }
}

impl HostDriver for LoggingHost {
    fn publish_pose(&self, device: DeviceIndex, pose: &DevicePose) {
        self.poses.fetch_add(1, Ordering::Relaxed);
        trace!(
            %device,
            x = pose.position.x,
            y = pose.position.y,
            z = pose.position.z,
            "Pose"
        );
    }

    fn set_float_property(&self, device: DeviceIndex, property: DeviceProperty, value: f32) {
        info!(%device, ?property, value, "Property");
    }

    fn set_string_property(&self, device: DeviceIndex, property: DeviceProperty, value: &str) {
        info!(%device, ?property, value, "Property");
    }

    fn set_bool_property(&self, device: DeviceIndex, property: DeviceProperty, value: bool) {
        debug!(%device, ?property, value, "Property");
    }

    fn set_uint64_property(&self, device: DeviceIndex, property: DeviceProperty, value: u64) {
        debug!(%device, ?property, value, "Property");
    }

    fn set_display_projection(
        &self,
        device: DeviceIndex,
        left: &ProjectionBounds,
        right: &ProjectionBounds,
    ) {
        info!(
            %device,
            left_l = left.left,
            left_r = left.right,
            right_l = right.left,
            right_r = right.right,
            top = left.top,
            "Projection"
        );
    }

    fn lens_distortion_changed(&self, device: DeviceIndex) {
        debug!(%device, "Lens distortion changed");
    }
}
