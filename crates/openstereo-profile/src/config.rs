//! The stereo configuration value.

use openstereo_input::{BindType, BoundKey};
use serde::{Deserialize, Serialize};

/// Every parameter the display, pose and hotkey code reads.
///
/// Field order is the canonical key order of profile documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoConfig {
    /// Game window position
    pub window_x: i32,
    pub window_y: i32,
    /// Game window size in pixels
    pub window_width: u32,
    pub window_height: u32,
    /// Per-eye render target, derived from the window and layout
    #[serde(skip)]
    pub render_width: u32,
    #[serde(skip)]
    pub render_height: u32,
    pub aspect_ratio: f32,
    /// Horizontal field of view in degrees
    pub fov: f32,
    /// Top/bottom instead of side-by-side
    pub tab_enable: bool,
    /// Half-width (or half-height) render target
    pub half_enable: bool,
    /// Swap the eyes
    pub reverse_enable: bool,
    /// Side-by-side using only the middle half of the window height
    pub vd_fsbs_hack: bool,
    /// Pixel gap between the two top/bottom images
    pub framepack_offset: u32,
    pub depth: f32,
    pub convergence: f32,
    /// Disable the built-in Ctrl+F-key hotkeys
    pub disable_hotkeys: bool,
    /// Pivot of the synthetic head
    pub hmd_height: f32,
    pub hmd_x: f32,
    pub hmd_y: f32,
    /// Yaw offset in degrees
    pub hmd_yaw: f32,
    pub pitch_enable: bool,
    pub yaw_enable: bool,
    /// Orbit radius of the head around the pivot as it pitches
    pub pitch_radius: f32,
    pub ctrl_deadzone: f32,
    pub ctrl_sensitivity: f32,
    pub pose_reset_key: BoundKey,
    pub ctrl_toggle_key: BoundKey,
    pub ctrl_toggle_type: BindType,
    pub use_open_track: bool,
    pub open_track_port: u16,
    /// Loopback channel through which a game mod pushes depth values.
    /// Read at activation; Ctrl+F11 flips it for the rest of the session.
    pub auto_depth_enable: bool,
    pub auto_depth_port: u16,
    /// Seconds from vsync to photons
    pub display_latency: f32,
    /// Refresh rate in Hz
    pub display_frequency: f32,
    pub user_settings: Vec<UserPreset>,
}

impl Default for StereoConfig {
    fn default() -> Self {
        let mut config = Self {
            window_x: 0,
            window_y: 0,
            window_width: 1920,
            window_height: 1080,
            render_width: 0,
            render_height: 0,
            aspect_ratio: 1.77778,
            fov: 90.0,
            tab_enable: false,
            half_enable: true,
            reverse_enable: false,
            vd_fsbs_hack: false,
            framepack_offset: 0,
            depth: 0.4,
            convergence: 4.0,
            disable_hotkeys: false,
            hmd_height: 1.0,
            hmd_x: 0.0,
            hmd_y: 0.0,
            hmd_yaw: 0.0,
            pitch_enable: false,
            yaw_enable: false,
            pitch_radius: 0.0,
            ctrl_deadzone: 0.05,
            ctrl_sensitivity: 1.0,
            pose_reset_key: BoundKey::new("VK_NUMPAD7"),
            ctrl_toggle_key: BoundKey::new("XINPUT_GAMEPAD_RIGHT_THUMB"),
            ctrl_toggle_type: BindType::Toggle,
            use_open_track: false,
            open_track_port: 4242,
            auto_depth_enable: true,
            auto_depth_port: 20020,
            display_latency: 0.011,
            display_frequency: 60.0,
            user_settings: vec![
                UserPreset::new("VK_NUMPAD1", "VK_NUMPAD4", BindType::Toggle, 0.5, 4.5),
                UserPreset::new("XINPUT_GAMEPAD_GUIDE", "", BindType::Hold, 0.1, 1.0),
            ],
        };
        config.update_render_size();
        config
    }
}

/// The compiled-in baseline every profile is read against.
pub fn load_defaults() -> StereoConfig {
    StereoConfig::default()
}

impl StereoConfig {
    /// Recompute `render_width`/`render_height` from the window and layout.
    pub fn update_render_size(&mut self) {
        let (width, height) = match (self.tab_enable, self.half_enable) {
            (false, true) => (self.window_width / 2, self.window_height),
            (true, true) => (self.window_width, self.window_height / 2),
            (_, false) => (self.window_width, self.window_height),
        };
        self.render_width = width;
        self.render_height = height;
    }

    /// Debounce length in ticks: 1.6 s worth of frames at the display rate.
    pub fn sleep_count_max(&self) -> u32 {
        let ticks = (1600.0 / (1000.0 / f64::from(self.display_frequency))).floor();
        if ticks.is_finite() && ticks > 0.0 {
            ticks.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }

    /// Number of hotkey ticks an overlay message stays up.
    pub fn overlay_ticks(&self) -> u32 {
        self.sleep_count_max().saturating_mul(3)
    }
}

/// A keybound depth/convergence snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreset {
    pub load_key: BoundKey,
    #[serde(default)]
    pub store_key: BoundKey,
    #[serde(default)]
    pub bind_type: BindType,
    pub depth: f32,
    pub convergence: f32,
    /// Hotkey-thread state, never persisted
    #[serde(skip)]
    pub runtime: PresetRuntime,
}

impl UserPreset {
    /// Build a preset from binding tokens.
    pub fn new(
        load_key: &str,
        store_key: &str,
        bind_type: BindType,
        depth: f32,
        convergence: f32,
    ) -> Self {
        Self {
            load_key: BoundKey::new(load_key),
            store_key: BoundKey::new(store_key),
            bind_type,
            depth,
            convergence,
            runtime: PresetRuntime::default(),
        }
    }
}

/// Mutable per-preset state owned by the hotkey thread.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PresetRuntime {
    /// Depth before the preset was applied
    pub prev_depth: f32,
    /// Convergence before the preset was applied
    pub prev_convergence: f32,
    /// A HOLD preset is currently applied
    pub was_held: bool,
    /// Ticks left before a TOGGLE may fire again
    pub sleep_count: u32,
}
