//! Live configuration shared by every worker thread.
//!
//! Lock discipline:
//! - `depth` and `convergence` are lock-free [`AtomicF32`] cells. Interactive
//!   adjustments go through CAS loops; the last writer wins.
//! - Everything else sits behind one `RwLock<StereoConfig>`. Readers hold the
//!   read lock only long enough to copy what they need. Nothing holds it across
//!   a host call, a projection recompute or file I/O.
//! - `generation` is bumped on every whole-config replacement so the hotkey
//!   thread can tell that its copy of the preset list went stale.
//! - The remaining flags are single-word requests and toggles.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use openstereo_atomic::AtomicF32;
use openstereo_profile::{DEFAULT_PROFILE, StereoConfig, UserPreset};
use parking_lot::RwLock;

/// The configuration as the running driver sees it.
#[derive(Debug)]
pub struct LiveConfig {
    config: RwLock<StereoConfig>,
    depth: AtomicF32,
    convergence: AtomicF32,
    generation: AtomicU64,
    /// Pending pose reset, consumed once by the pose thread
    pose_reset: AtomicBool,
    /// Runtime switch layered over the profile's `pitch_enable`/`yaw_enable`
    controls_enabled: AtomicBool,
    auto_depth_enabled: AtomicBool,
    /// Profile that Ctrl+F7 saves to and Ctrl+F10 reloads
    active_profile: RwLock<String>,
}

impl LiveConfig {
    pub fn new(config: StereoConfig) -> Self {
        Self {
            depth: AtomicF32::new(config.depth),
            convergence: AtomicF32::new(config.convergence),
            auto_depth_enabled: AtomicBool::new(config.auto_depth_enable),
            config: RwLock::new(config),
            generation: AtomicU64::new(0),
            pose_reset: AtomicBool::new(false),
            controls_enabled: AtomicBool::new(true),
            active_profile: RwLock::new(DEFAULT_PROFILE.to_owned()),
        }
    }

    /// Current depth.
    pub fn depth(&self) -> f32 {
        self.depth.load()
    }

    /// Current convergence.
    pub fn convergence(&self) -> f32 {
        self.convergence.load()
    }

    pub(crate) fn depth_cell(&self) -> &AtomicF32 {
        &self.depth
    }

    pub(crate) fn convergence_cell(&self) -> &AtomicF32 {
        &self.convergence
    }

    /// A full copy with depth and convergence taken from the atomics.
    pub fn snapshot(&self) -> StereoConfig {
        let mut config = self.config.read().clone();
        config.depth = self.depth();
        config.convergence = self.convergence();
        config
    }

    /// Run `f` under the read lock.
    ///
    /// The `depth`/`convergence` fields seen here may lag the atomics; use
    /// [`depth`](Self::depth) and [`convergence`](Self::convergence) instead.
    pub fn read<R>(&self, f: impl FnOnce(&StereoConfig) -> R) -> R {
        f(&*self.config.read())
    }

    /// Edit fields in place under the write lock. Does not bump the
    /// generation; use [`replace`](Self::replace) for whole-config loads.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut StereoConfig) -> R) -> R {
        f(&mut *self.config.write())
    }

    /// Install a freshly loaded config and bump the generation.
    ///
    /// Depth and convergence must already have been pushed through the
    /// controller; the copies stored here are only for snapshots.
    ///
    /// The auto-depth switch is runtime state and survives the swap.
    pub(crate) fn replace(&self, config: StereoConfig) -> u64 {
        self.controls_enabled.store(true, Ordering::Release);
        let mut guard = self.config.write();
        *guard = config;
        self.generation.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    /// Number of whole-config replacements so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// The preset list with the generation it belongs to.
    pub fn presets(&self) -> (u64, Vec<UserPreset>) {
        let guard = self.config.read();
        (self.generation(), guard.user_settings.clone())
    }

    /// Store an edited preset list, unless a profile load replaced the
    /// config since `generation` was read. Returns whether it was stored.
    pub fn write_back_presets(&self, generation: u64, presets: &[UserPreset]) -> bool {
        let mut guard = self.config.write();
        if self.generation() != generation {
            return false;
        }
        guard.user_settings = presets.to_vec();
        true
    }

    /// Ask the pose thread to recenter on its next tick.
    pub fn request_pose_reset(&self) {
        self.pose_reset.store(true, Ordering::Release);
    }

    /// Consume a pending reset request.
    pub fn take_pose_reset(&self) -> bool {
        self.pose_reset.swap(false, Ordering::AcqRel)
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled.load(Ordering::Acquire)
    }

    pub fn set_controls_enabled(&self, enabled: bool) {
        self.controls_enabled.store(enabled, Ordering::Release);
    }

    pub fn auto_depth_enabled(&self) -> bool {
        self.auto_depth_enabled.load(Ordering::Acquire)
    }

    pub fn set_auto_depth_enabled(&self, enabled: bool) {
        self.auto_depth_enabled.store(enabled, Ordering::Release);
    }

    /// Flip the auto-depth switch, returning the new state.
    pub fn toggle_auto_depth(&self) -> bool {
        !self.auto_depth_enabled.fetch_xor(true, Ordering::AcqRel)
    }

    /// Effective `(pitch, yaw)` enablement: the profile flags gated by the
    /// runtime control switch.
    pub fn analog_controls(&self) -> (bool, bool) {
        let enabled = self.controls_enabled();
        self.read(|c| (enabled && c.pitch_enable, enabled && c.yaw_enable))
    }

    /// Name of the profile the driver is currently following.
    pub fn active_profile(&self) -> String {
        self.active_profile.read().clone()
    }

    pub(crate) fn set_active_profile(&self, name: &str) {
        name.clone_into(&mut *self.active_profile.write());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reads_atomics() {
        let live = LiveConfig::new(StereoConfig::default());
        live.depth_cell().store(0.9);
        let snap = live.snapshot();
        assert_eq!(snap.depth.to_bits(), 0.9_f32.to_bits());
        assert_eq!(snap.convergence.to_bits(), 4.0_f32.to_bits());
    }

    #[test]
    fn stale_preset_write_back_is_discarded() {
        let live = LiveConfig::new(StereoConfig::default());
        let (generation, mut presets) = live.presets();
        if let Some(preset) = presets.first_mut() {
            preset.depth = 0.0;
        }

        live.replace(StereoConfig::default());
        assert!(!live.write_back_presets(generation, &presets));
        assert_eq!(live.read(|c| c.user_settings.clone()), StereoConfig::default().user_settings);

        let (generation, presets) = live.presets();
        assert!(live.write_back_presets(generation, &presets));
    }

    #[test]
    fn pose_reset_is_consumed_once() {
        let live = LiveConfig::new(StereoConfig::default());
        assert!(!live.take_pose_reset());
        live.request_pose_reset();
        live.request_pose_reset();
        assert!(live.take_pose_reset());
        assert!(!live.take_pose_reset());
    }

    #[test]
    fn controls_gate_profile_flags() {
        let live = LiveConfig::new(StereoConfig {
            pitch_enable: true,
            yaw_enable: false,
            ..StereoConfig::default()
        });
        assert_eq!(live.analog_controls(), (true, false));
        live.set_controls_enabled(false);
        assert_eq!(live.analog_controls(), (false, false));
    }

    #[test]
    fn auto_depth_toggle_reports_new_state() {
        let live = LiveConfig::new(StereoConfig::default());
        assert!(live.auto_depth_enabled());
        assert!(!live.toggle_auto_depth());
        assert!(live.toggle_auto_depth());
    }

    #[test]
    fn profile_swap_keeps_auto_depth_switch() {
        let live = LiveConfig::new(StereoConfig::default());
        live.toggle_auto_depth();
        live.replace(StereoConfig::default());
        assert!(!live.auto_depth_enabled());
    }
}
