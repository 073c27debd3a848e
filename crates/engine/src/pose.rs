//! Synthesized head pose.
//!
//! There is no tracker. The pose is a fixed pivot that the right stick can
//! pitch and yaw, optionally composed with an external attitude from the
//! telemetry receiver. With a non-zero `pitch_radius` the head orbits the
//! pivot instead of rotating in place.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::{Quat, Vec3};
use openstereo_atomic::DriverCounters;
use openstereo_input::{GamepadState, InputBackend, apply_deadzone};
use openstereo_profile::StereoConfig;
use openstereo_scheduler::TickScheduler;
use openstereo_telemetry::SharedAttitude;
use parking_lot::Mutex;
use tracing::{debug, error, info, trace};

use crate::host::{DevicePose, HostGate};
use crate::shared::LiveConfig;

/// Pitch limit in degrees.
pub const MAX_PITCH_DEG: f32 = 90.0;

/// Everything one tick of [`PoseSynthesizer`] reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseInputs {
    /// Gamepad sample, `None` when no pad is connected
    pub gamepad: Option<GamepadState>,
    pub pitch_enable: bool,
    pub yaw_enable: bool,
    pub deadzone: f32,
    /// Degrees per tick at full stick deflection
    pub sensitivity: f32,
    pub pitch_radius: f32,
    pub hmd_x: f32,
    pub hmd_y: f32,
    pub hmd_height: f32,
    /// Degrees
    pub hmd_yaw: f32,
    /// Recenter this tick
    pub reset: bool,
    /// External attitude, composed after pitch and yaw
    pub external: Option<Quat>,
}

impl PoseInputs {
    /// Inputs from a config with no gamepad, reset or external attitude.
    pub fn from_config(config: &StereoConfig) -> Self {
        Self {
            gamepad: None,
            pitch_enable: config.pitch_enable,
            yaw_enable: config.yaw_enable,
            deadzone: config.ctrl_deadzone,
            sensitivity: config.ctrl_sensitivity,
            pitch_radius: config.pitch_radius,
            hmd_x: config.hmd_x,
            hmd_y: config.hmd_y,
            hmd_height: config.hmd_height,
            hmd_yaw: config.hmd_yaw,
            reset: false,
            external: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Previous {
    pose: DevicePose,
    pitch: f32,
    yaw: f32,
}

/// Pitch/yaw integrator and orbit model.
#[derive(Debug, Clone)]
pub struct PoseSynthesizer {
    /// Degrees, within ±[`MAX_PITCH_DEG`]
    pitch: f32,
    yaw: Quat,
    last_hmd_yaw: f32,
    previous: Option<Previous>,
}

impl Default for PoseSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseSynthesizer {
    pub fn new() -> Self {
        Self {
            pitch: 0.0,
            yaw: Quat::IDENTITY,
            last_hmd_yaw: 0.0,
            previous: None,
        }
    }

    /// Accumulated pitch in degrees.
    pub fn pitch_degrees(&self) -> f32 {
        self.pitch
    }

    /// Accumulated yaw rotation, including the `hmd_yaw` offset.
    pub fn yaw(&self) -> Quat {
        self.yaw
    }

    /// Advance by one tick. `dt` is the measured time since the previous
    /// tick in seconds; derivatives are zero on the first tick and whenever
    /// `dt` is not positive.
    pub fn tick(&mut self, inputs: &PoseInputs, dt: f32) -> DevicePose {
        let stick = inputs.gamepad.map(|pad| pad.right_stick());

        if inputs.pitch_enable
            && let Some((_, y)) = stick
        {
            let step = apply_deadzone(y, inputs.deadzone) * inputs.sensitivity;
            let pitch = self.pitch + step;
            if pitch.is_finite() {
                self.pitch = pitch.clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);
            }
        }

        if inputs.hmd_yaw.to_bits() != self.last_hmd_yaw.to_bits() {
            self.yaw = yaw_offset(inputs.hmd_yaw);
            self.last_hmd_yaw = inputs.hmd_yaw;
        }

        if inputs.yaw_enable
            && let Some((x, _)) = stick
        {
            let degrees = -apply_deadzone(x, inputs.deadzone) * inputs.sensitivity;
            if degrees.is_finite() {
                let adjust = Quat::from_axis_angle(Vec3::Y, degrees.to_radians());
                self.yaw = (adjust * self.yaw).normalize();
            }
        }

        if inputs.reset {
            self.pitch = 0.0;
            self.yaw = yaw_offset(inputs.hmd_yaw);
            debug!(hmd_yaw = inputs.hmd_yaw, "Pose recentered");
        }

        let pitch = self.pitch.to_radians();
        let yaw = 2.0 * self.yaw.y.atan2(self.yaw.w);
        let external = inputs.external.unwrap_or(Quat::IDENTITY);
        let rotation = (self.yaw * Quat::from_axis_angle(Vec3::X, pitch) * external).normalize();
        let position = orbit_position(inputs, pitch, yaw);

        let mut pose = DevicePose {
            position,
            rotation,
            pose_is_valid: true,
            device_is_connected: true,
            ..DevicePose::default()
        };

        if let Some(previous) = self.previous
            && dt > 0.0
            && dt.is_finite()
        {
            pose.velocity = (position - previous.pose.position) / dt;
            pose.acceleration = (pose.velocity - previous.pose.velocity) / dt;
            pose.angular_velocity = Vec3::new(
                angle_difference(pitch, previous.pitch) / dt,
                angle_difference(yaw, previous.yaw) / dt,
                0.0,
            );
            pose.angular_acceleration =
                (pose.angular_velocity - previous.pose.angular_velocity) / dt;
        }

        self.previous = Some(Previous { pose, pitch, yaw });
        pose
    }
}

fn yaw_offset(degrees: f32) -> Quat {
    Quat::from_axis_angle(Vec3::Y, degrees.to_radians())
}

/// Head position orbiting the pivot at `pitch_radius`. Never more than one
/// unit below `hmd_height`.
fn orbit_position(inputs: &PoseInputs, pitch: f32, yaw: f32) -> Vec3 {
    let r = inputs.pitch_radius;
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Vec3::new(
        inputs.hmd_x + (r * pitch.cos() * sin_yaw - r * sin_yaw),
        (inputs.hmd_height - r * pitch.sin()).max(inputs.hmd_height - 1.0),
        inputs.hmd_y + (r * pitch.cos() * cos_yaw - r * cos_yaw),
    )
}

/// `a - b` wrapped into `[-π, π)`.
pub fn angle_difference(a: f32, b: f32) -> f32 {
    (a - b + PI).rem_euclid(TAU) - PI
}

/// The pose thread.
pub struct PoseWorker {
    synthesizer: PoseSynthesizer,
    live: Arc<LiveConfig>,
    gate: Arc<HostGate>,
    attitude: Arc<SharedAttitude>,
    last_pose: Arc<Mutex<DevicePose>>,
    counters: Arc<DriverCounters>,
}

impl std::fmt::Debug for PoseWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseWorker")
            .field("synthesizer", &self.synthesizer)
            .finish_non_exhaustive()
    }
}

impl PoseWorker {
    pub fn new(
        live: Arc<LiveConfig>,
        gate: Arc<HostGate>,
        attitude: Arc<SharedAttitude>,
        last_pose: Arc<Mutex<DevicePose>>,
        counters: Arc<DriverCounters>,
    ) -> Self {
        Self {
            synthesizer: PoseSynthesizer::new(),
            live,
            gate,
            attitude,
            last_pose,
            counters,
        }
    }

    /// Gather inputs, advance the synthesizer, publish.
    pub fn step(&mut self, input: &dyn InputBackend, dt: f32) -> DevicePose {
        let (pitch_enable, yaw_enable) = self.live.analog_controls();
        let (mut inputs, use_open_track) = self
            .live
            .read(|c| (PoseInputs::from_config(c), c.use_open_track));
        inputs.gamepad = input.gamepad();
        inputs.pitch_enable = pitch_enable;
        inputs.yaw_enable = yaw_enable;
        inputs.reset = self.live.take_pose_reset();
        inputs.external = use_open_track.then(|| self.attitude.get());

        let pose = self.synthesizer.tick(&inputs, dt);
        *self.last_pose.lock() = pose;
        if !self.gate.publish_pose(&pose) {
            trace!("Pose not published");
        }
        self.counters.inc_pose_tick();
        pose
    }

    /// Tick at the display rate, capped at 125 Hz, until `active` clears.
    pub fn run(mut self, input: &dyn InputBackend, active: &AtomicBool) {
        let frequency = self.live.read(|c| c.display_frequency);
        let mut scheduler = match TickScheduler::polling_at(frequency) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                error!(error = %e, "Pose thread cannot start");
                return;
            }
        };
        info!(period_us = scheduler.period().as_micros(), "Pose thread started");

        while active.load(Ordering::Acquire) {
            let tick = scheduler.begin_tick();
            self.step(input, tick.delta_secs());
            if scheduler.end_tick() {
                self.counters.inc_pose_overrun();
            }
        }
        debug!(
            ticks = scheduler.tick_count(),
            overruns = scheduler.metrics().overruns,
            "Pose thread stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-5;

    fn inputs() -> PoseInputs {
        PoseInputs::from_config(&StereoConfig {
            pitch_enable: true,
            yaw_enable: true,
            ctrl_deadzone: 0.0,
            ..StereoConfig::default()
        })
    }

    fn stick(x: i16, y: i16) -> Option<GamepadState> {
        Some(GamepadState {
            thumb_rx: x,
            thumb_ry: y,
            ..GamepadState::default()
        })
    }

    #[test]
    fn idle_pose_sits_on_the_pivot() {
        let mut synth = PoseSynthesizer::new();
        let pose = synth.tick(
            &PoseInputs {
                hmd_x: 0.3,
                hmd_y: -0.2,
                pitch_radius: 0.5,
                ..inputs()
            },
            0.01,
        );
        assert_eq!(
            pose.position.to_array().map(f32::to_bits),
            [0.3_f32, 1.0, -0.2].map(f32::to_bits)
        );
        assert!(pose.rotation.abs_diff_eq(Quat::IDENTITY, EPS));
        assert!(pose.pose_is_valid && pose.device_is_connected);
    }

    #[test]
    fn first_tick_has_no_derivatives() {
        let mut synth = PoseSynthesizer::new();
        let pose = synth.tick(&PoseInputs { gamepad: stick(32767, 32767), ..inputs() }, 0.01);
        assert_eq!(pose.velocity, Vec3::ZERO);
        assert_eq!(pose.angular_velocity, Vec3::ZERO);
        assert_eq!(pose.angular_acceleration, Vec3::ZERO);
    }

    #[test]
    fn non_positive_dt_has_no_derivatives() {
        let mut synth = PoseSynthesizer::new();
        let held = PoseInputs { gamepad: stick(0, 32767), ..inputs() };
        synth.tick(&held, 0.01);
        let pose = synth.tick(&held, 0.0);
        assert_eq!(pose.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn full_stick_pitches_by_sensitivity() {
        let mut synth = PoseSynthesizer::new();
        let held = PoseInputs { gamepad: stick(0, 32767), ..inputs() };
        synth.tick(&held, 0.01);
        let pose = synth.tick(&held, 0.01);
        assert!((synth.pitch_degrees() - 2.0).abs() < EPS);
        let expected = 1.0_f32.to_radians() / 0.01;
        assert!((pose.angular_velocity.x - expected).abs() < 1e-3);
    }

    #[test]
    fn pitch_clamps_at_ninety() {
        let mut synth = PoseSynthesizer::new();
        let held = PoseInputs {
            gamepad: stick(0, -32767),
            sensitivity: 50.0,
            ..inputs()
        };
        for _ in 0..5 {
            synth.tick(&held, 0.01);
        }
        assert_eq!(synth.pitch_degrees().to_bits(), (-MAX_PITCH_DEG).to_bits());
    }

    #[test]
    fn stick_right_turns_clockwise() {
        let mut synth = PoseSynthesizer::new();
        synth.tick(&PoseInputs { gamepad: stick(32767, 0), ..inputs() }, 0.01);
        let (axis, angle) = synth.yaw().to_axis_angle();
        assert!((angle - 1.0_f32.to_radians()).abs() < EPS);
        assert!(axis.y < 0.0);
    }

    #[test]
    fn disabled_axes_ignore_the_stick() {
        let mut synth = PoseSynthesizer::new();
        let pose = synth.tick(
            &PoseInputs {
                gamepad: stick(32767, 32767),
                pitch_enable: false,
                yaw_enable: false,
                ..inputs()
            },
            0.01,
        );
        assert!(pose.rotation.abs_diff_eq(Quat::IDENTITY, EPS));
    }

    #[test]
    fn reset_recenters_to_hmd_yaw() {
        let mut synth = PoseSynthesizer::new();
        let held = PoseInputs {
            gamepad: stick(32767, 32767),
            hmd_yaw: 30.0,
            ..inputs()
        };
        for _ in 0..3 {
            synth.tick(&held, 0.01);
        }
        synth.tick(&PoseInputs { gamepad: None, reset: true, ..held }, 0.01);
        assert_eq!(synth.pitch_degrees().to_bits(), 0.0_f32.to_bits());
        assert!(synth.yaw().abs_diff_eq(yaw_offset(30.0), EPS));
    }

    #[test]
    fn hmd_yaw_change_replaces_accumulated_yaw() {
        let mut synth = PoseSynthesizer::new();
        let held = PoseInputs { gamepad: stick(32767, 0), ..inputs() };
        synth.tick(&held, 0.01);
        synth.tick(&PoseInputs { gamepad: None, hmd_yaw: -45.0, ..held }, 0.01);
        assert!(synth.yaw().abs_diff_eq(yaw_offset(-45.0), EPS));
    }

    #[test]
    fn orbit_drops_head_but_not_below_floor() {
        let mut synth = PoseSynthesizer::new();
        let pose = synth.tick(
            &PoseInputs {
                gamepad: stick(0, 32767),
                sensitivity: 90.0,
                pitch_radius: 3.0,
                ..inputs()
            },
            0.01,
        );
        assert!((pose.position.y - 0.0).abs() < EPS, "y {}", pose.position.y);
    }

    #[test]
    fn external_attitude_is_composed_last() {
        let mut synth = PoseSynthesizer::new();
        let roll = Quat::from_axis_angle(Vec3::Z, 0.5);
        let pose = synth.tick(&PoseInputs { external: Some(roll), ..inputs() }, 0.01);
        assert!(pose.rotation.abs_diff_eq(roll, EPS));
    }

    #[test]
    fn angle_difference_wraps() {
        assert!((angle_difference(PI - 0.1, -PI + 0.1) + 0.2).abs() < EPS);
        assert!((angle_difference(0.3, 0.1) - 0.2).abs() < EPS);
    }

    proptest! {
        #[test]
        fn rotation_stays_unit(
            samples in prop::collection::vec((any::<i16>(), any::<i16>()), 1..64),
            sensitivity in 0.0f32..20.0,
            hmd_yaw in -180.0f32..180.0,
        ) {
            let mut synth = PoseSynthesizer::new();
            for (x, y) in samples {
                let pose = synth.tick(
                    &PoseInputs { gamepad: stick(x, y), sensitivity, hmd_yaw, ..inputs() },
                    0.008,
                );
                prop_assert!((pose.rotation.length() - 1.0).abs() < 1e-4);
                prop_assert!(pose.position.is_finite());
                prop_assert!(synth.pitch_degrees().abs() <= MAX_PITCH_DEG);
            }
        }

        #[test]
        fn zero_pitch_keeps_position_on_pivot(
            x in -32767i16..=32767,
            radius in 0.0f32..2.0,
            hmd_x in -2.0f32..2.0,
            hmd_y in -2.0f32..2.0,
        ) {
            let mut synth = PoseSynthesizer::new();
            let pose = synth.tick(
                &PoseInputs {
                    gamepad: stick(x, 0),
                    pitch_radius: radius,
                    hmd_x,
                    hmd_y,
                    ..inputs()
                },
                0.008,
            );
            prop_assert!((pose.position.x - hmd_x).abs() <= f32::EPSILON);
            prop_assert!((pose.position.z - hmd_y).abs() <= f32::EPSILON);
        }
    }
}
