//! Runtime parameter controller.
//!
//! The only writer of depth, convergence and the pose tuning fields while the
//! driver runs. Every mutation is a CAS loop on the atomics or a short write
//! lock on the live config; host notifications happen after the lock is gone.

use std::sync::Arc;

use openstereo_atomic::DriverCounters;
use openstereo_profile::{MIN_CONVERGENCE, StereoConfig};
use tracing::{debug, info};

use crate::display::StereoDisplay;
use crate::host::{DeviceProperty, HostGate};
use crate::shared::LiveConfig;

/// Pose offset nudged by [`ParameterController::nudge_origin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginAxis {
    /// `hmd_x`
    X,
    /// `hmd_y`
    Y,
    /// `hmd_height`
    Height,
    /// `hmd_yaw`, in degrees
    Yaw,
}

/// Applies interactive and profile-driven parameter changes.
#[derive(Debug)]
pub struct ParameterController {
    live: Arc<LiveConfig>,
    display: StereoDisplay,
    host: Arc<HostGate>,
    counters: Arc<DriverCounters>,
}

impl ParameterController {
    pub fn new(live: Arc<LiveConfig>, host: Arc<HostGate>, counters: Arc<DriverCounters>) -> Self {
        Self {
            display: StereoDisplay::new(Arc::clone(&live)),
            live,
            host,
            counters,
        }
    }

    pub fn live(&self) -> &Arc<LiveConfig> {
        &self.live
    }

    /// Set depth to `value`, or add it when `is_delta`. Clamped to `>= 0`;
    /// a non-finite result leaves depth unchanged.
    ///
    /// Pushes the new value as `UserIpdMeters`. The projection is not
    /// recomputed here.
    pub fn adjust_depth(&self, value: f32, is_delta: bool) -> f32 {
        let (_, depth) = self.live.depth_cell().update(|current| {
            let target = if is_delta { current + value } else { value };
            if target.is_finite() {
                target.max(0.0)
            } else {
                current
            }
        });
        self.host.set_float_property(DeviceProperty::UserIpdMeters, depth);
        self.counters.inc_depth_update();
        depth
    }

    /// Set convergence to `value`, or add it when `is_delta`. Floored at
    /// [`MIN_CONVERGENCE`].
    ///
    /// Returns `false` without touching anything if the result is
    /// bit-identical to the current value. Otherwise both eye projections
    /// are recomputed from the committed value and pushed, followed by a
    /// lens-distortion change notification.
    pub fn adjust_convergence(&self, value: f32, is_delta: bool) -> bool {
        let committed = self.live.convergence_cell().update_if_changed(|current| {
            let target = if is_delta { current + value } else { value };
            if target.is_finite() {
                target.max(MIN_CONVERGENCE)
            } else {
                current
            }
        });
        match committed {
            Some((_, convergence)) => {
                self.push_projection_for(convergence);
                true
            }
            None => false,
        }
    }

    /// Recompute and push both eye projections from the live values.
    pub fn push_projection(&self) {
        self.push_projection_for(self.live.convergence());
    }

    fn push_projection_for(&self, convergence: f32) {
        let (left, right) = self.display.projections_with(convergence);
        self.host.set_display_projection(&left, &right);
        self.host.lens_distortion_changed();
        self.counters.inc_projection_update();
        debug!(convergence, "Pushed eye projections");
    }

    /// Add `delta` to the stick sensitivity, floored at 0.
    pub fn adjust_sensitivity(&self, delta: f32) -> f32 {
        self.live.update(|config| {
            config.ctrl_sensitivity = floor_add(config.ctrl_sensitivity, delta, 0.0);
            config.ctrl_sensitivity
        })
    }

    /// Add `delta` to the pitch orbit radius, floored at 0.
    pub fn adjust_radius(&self, delta: f32) -> f32 {
        self.live.update(|config| {
            config.pitch_radius = floor_add(config.pitch_radius, delta, 0.0);
            config.pitch_radius
        })
    }

    /// Move the pose pivot along `axis`. Returns the new value.
    pub fn nudge_origin(&self, axis: OriginAxis, delta: f32) -> f32 {
        self.live.update(|config| {
            let field = match axis {
                OriginAxis::X => &mut config.hmd_x,
                OriginAxis::Y => &mut config.hmd_y,
                OriginAxis::Height => &mut config.hmd_height,
                OriginAxis::Yaw => &mut config.hmd_yaw,
            };
            let moved = *field + delta;
            if moved.is_finite() {
                *field = moved;
            }
            *field
        })
    }

    /// Turn the analog pitch/yaw controls on or off at runtime.
    pub fn set_controls_enabled(&self, enabled: bool) {
        self.live.set_controls_enabled(enabled);
        debug!(enabled, "Analog controls");
    }

    /// Switch to a freshly loaded profile.
    ///
    /// Depth and convergence go through the normal adjust path first, then
    /// the rest of the config is swapped in under the write lock, the
    /// projection is re-pushed for the new FOV/aspect and the pose is
    /// recentered.
    pub fn apply_config(&self, mut config: StereoConfig) {
        let depth = config.depth;
        let convergence = config.convergence;

        config.depth = self.adjust_depth(depth, false);
        self.adjust_convergence(convergence, false);
        config.convergence = self.live.convergence();
        config.update_render_size();

        let generation = self.live.replace(config);
        self.push_projection();
        self.live.request_pose_reset();
        self.counters.inc_profile_load();
        info!(generation, depth, convergence, "Applied profile");
    }
}

fn floor_add(value: f32, delta: f32, min: f32) -> f32 {
    let sum = value + delta;
    if sum.is_finite() { sum.max(min) } else { value }
}
