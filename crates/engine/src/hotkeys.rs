//! The hotkey worker.
//!
//! One tick per display frame. Each tick, in order:
//!
//! 1. built-in Ctrl hotkeys (depth, convergence, profile save/reload, auto
//!    depth, HMD offsets, stick sensitivity, pitch radius)
//! 2. user bindings: control toggle, pose reset, presets
//! 3. Ctrl+navigation keys moving the pose origin
//! 4. pending profile notices from process events
//! 5. one overlay frame, if a message is live

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use openstereo_atomic::DriverCounters;
use openstereo_input::{InputBackend, InputFrame, VirtualKey};
use openstereo_scheduler::TickScheduler;
use tracing::{debug, error, info, warn};

use crate::controller::{OriginAxis, ParameterController};
use crate::debounce::Debounce;
use crate::feedback::{Cue, UserFeedback};
use crate::presets::{ControlToggle, PresetBank, PresetEvent};
use crate::session::{ProfileSession, file_name};

const DEPTH_STEP: f32 = 0.001;
const CONVERGENCE_STEP: f32 = 0.005;
const TUNING_STEP: f32 = 0.01;
const POSITION_STEP: f32 = 0.01;
const YAW_STEP: f32 = 0.1;

/// Hotkey loop period: one display frame, in whole milliseconds.
pub fn hotkey_period(display_frequency: f32) -> Duration {
    let millis = (1000.0 / f64::from(display_frequency)).floor();
    if !millis.is_finite() || millis < 1.0 {
        return Duration::from_millis(1);
    }
    Duration::try_from_secs_f64(millis.min(1000.0) / 1000.0).unwrap_or(Duration::from_millis(1))
}

#[derive(Debug, Default)]
struct Overlay {
    message: String,
    remaining: u32,
}

/// State owned by the hotkey thread.
pub struct HotkeyWorker {
    controller: Arc<ParameterController>,
    session: Arc<ProfileSession>,
    feedback: Arc<dyn UserFeedback>,
    presets: PresetBank,
    control_toggle: ControlToggle,
    pose_reset: Debounce,
    save: Debounce,
    auto_depth: Debounce,
    offsets: Debounce,
    overlay: Overlay,
}

impl std::fmt::Debug for HotkeyWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyWorker")
            .field("presets", &self.presets)
            .field("overlay", &self.overlay)
            .finish_non_exhaustive()
    }
}

impl HotkeyWorker {
    pub fn new(
        controller: Arc<ParameterController>,
        session: Arc<ProfileSession>,
        feedback: Arc<dyn UserFeedback>,
    ) -> Self {
        Self {
            controller,
            session,
            feedback,
            presets: PresetBank::new(),
            control_toggle: ControlToggle::new(),
            pose_reset: Debounce::default(),
            save: Debounce::default(),
            auto_depth: Debounce::default(),
            offsets: Debounce::default(),
            overlay: Overlay::default(),
        }
    }

    /// The overlay message and the ticks it has left.
    pub fn overlay(&self) -> (&str, u32) {
        (&self.overlay.message, self.overlay.remaining)
    }

    /// Poll `input` until `active` clears.
    pub fn run(
        mut self,
        input: &dyn InputBackend,
        active: &AtomicBool,
        counters: &DriverCounters,
    ) {
        let frequency = self.controller.live().read(|c| c.display_frequency);
        let mut scheduler = match TickScheduler::with_period(hotkey_period(frequency)) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                error!(error = %e, "Hotkey thread cannot start");
                return;
            }
        };
        info!(period_ms = scheduler.period().as_millis(), "Hotkey thread started");

        while active.load(Ordering::Acquire) {
            scheduler.begin_tick();
            self.tick(&InputFrame::capture(input));
            counters.inc_input_tick();
            scheduler.end_tick();
        }
        debug!(ticks = scheduler.tick_count(), "Hotkey thread stopped");
    }

    /// Evaluate one frame of input.
    pub fn tick(&mut self, frame: &InputFrame<'_>) {
        let live = Arc::clone(self.controller.live());
        let (hotkeys_disabled, sleep_max, overlay_ticks) = live.read(|c| {
            (c.disable_hotkeys, c.sleep_count_max(), c.overlay_ticks())
        });
        let ctrl = frame.is_key_down(VirtualKey::CONTROL);
        let shift = frame.is_key_down(VirtualKey::SHIFT);
        let chord = |key: VirtualKey| ctrl && frame.is_key_down(key);

        if !hotkeys_disabled {
            self.stereo_keys(&chord, shift, overlay_ticks);
            self.profile_keys(&chord, shift, sleep_max, overlay_ticks);

            if self.auto_depth.trigger(chord(VirtualKey::F11), sleep_max) {
                let enabled = live.toggle_auto_depth();
                info!(enabled, "Auto depth toggled");
                self.show(if enabled { "Auto Depth On" } else { "Auto Depth Off" }, overlay_ticks);
            }
        }

        if self.offsets.trigger(chord(VirtualKey::F9), sleep_max) {
            match self.session.save_hmd_offsets() {
                Ok(()) => {
                    self.feedback.cue(Cue::Success);
                    self.show("Saved HMD Offsets", overlay_ticks);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to save HMD offsets");
                    self.feedback.cue(Cue::Failure);
                    self.show("Failed to save HMD Offsets", overlay_ticks);
                }
            }
        }

        self.tuning_keys(&chord, overlay_ticks);

        let binding_message = self.check_user_settings(frame, sleep_max);
        let position_message = self.check_position_input(frame, ctrl, shift);
        if let Some(message) = binding_message.or(position_message) {
            self.show(&message, overlay_ticks);
        }

        if let Some(notice) = self.session.take_notice() {
            self.show(&notice.message(), overlay_ticks);
        }

        if self.overlay.remaining > 0 {
            self.feedback.overlay(&self.overlay.message);
            self.overlay.remaining = self.overlay.remaining.saturating_sub(1);
        }
    }

    fn show(&mut self, message: &str, ticks: u32) {
        message.clone_into(&mut self.overlay.message);
        self.overlay.remaining = ticks;
    }

    fn depth_convergence_message(&self) -> String {
        let live = self.controller.live();
        format!("Depth: {:.3} Conv: {:.3}", live.depth(), live.convergence())
    }

    /// Ctrl+F3/F4 lower/raise depth, Ctrl+F5/F6 raise/lower convergence.
    /// Continuous while held.
    fn stereo_keys(&mut self, chord: &impl Fn(VirtualKey) -> bool, shift: bool, overlay_ticks: u32) {
        let depth_delta = if chord(VirtualKey::F3) {
            Some(-DEPTH_STEP)
        } else if chord(VirtualKey::F4) {
            Some(DEPTH_STEP)
        } else {
            None
        };

        if let Some(delta) = depth_delta {
            self.controller.adjust_depth(delta, true);
            if shift {
                self.controller.push_projection();
            }
        } else if chord(VirtualKey::F5) {
            self.controller.adjust_convergence(CONVERGENCE_STEP, true);
        } else if chord(VirtualKey::F6) {
            self.controller.adjust_convergence(-CONVERGENCE_STEP, true);
        } else {
            return;
        }
        let message = self.depth_convergence_message();
        self.show(&message, overlay_ticks);
    }

    /// Ctrl+F7 save, Ctrl+F10 reload (Ctrl+Shift+F10: default profile).
    /// Both share one debounce.
    fn profile_keys(
        &mut self,
        chord: &impl Fn(VirtualKey) -> bool,
        shift: bool,
        sleep_max: u32,
        overlay_ticks: u32,
    ) {
        if chord(VirtualKey::F7) && self.save.is_ready() {
            match self.session.save_current() {
                Ok(Some(profile)) => {
                    self.feedback.cue(Cue::Success);
                    self.show(&format!("Saved {} profile", file_name(&profile)), overlay_ticks);
                }
                Ok(None) => {
                    debug!("No application profile to save");
                    self.feedback.cue(Cue::Failure);
                    self.show("Failed to save profile", overlay_ticks);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to save profile");
                    self.feedback.cue(Cue::Failure);
                    self.show("Failed to save profile", overlay_ticks);
                }
            }
            self.save.arm(sleep_max);
        } else if chord(VirtualKey::F10) && self.save.is_ready() {
            match self.session.reload(shift) {
                Ok(Some(profile)) => {
                    self.feedback.cue(Cue::Success);
                    self.show(&format!("Loaded {} profile", file_name(&profile)), overlay_ticks);
                }
                Ok(None) => {
                    debug!("No application profile to reload");
                    self.feedback.cue(Cue::Failure);
                    self.show("Failed to load profile", overlay_ticks);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to reload profile");
                    self.feedback.cue(Cue::Failure);
                    self.show("Failed to load profile", overlay_ticks);
                }
            }
            self.save.arm(sleep_max);
        } else {
            self.save.tick();
        }
    }

    /// Ctrl+-/= stick sensitivity, Ctrl+[/] pitch radius.
    fn tuning_keys(&mut self, chord: &impl Fn(VirtualKey) -> bool, overlay_ticks: u32) {
        let (pitch, yaw) = self.controller.live().analog_controls();

        let sensitivity_delta = if chord(VirtualKey::OEM_MINUS) {
            Some(-TUNING_STEP)
        } else if chord(VirtualKey::OEM_PLUS) {
            Some(TUNING_STEP)
        } else {
            None
        };
        if let Some(delta) = sensitivity_delta {
            let value = if pitch || yaw {
                self.controller.adjust_sensitivity(delta)
            } else {
                self.controller.live().read(|c| c.ctrl_sensitivity)
            };
            self.show(&format!("Ctrl Sensitivity: {value:.2}"), overlay_ticks);
        }

        let radius_delta = if chord(VirtualKey::LBRACKET) {
            Some(-TUNING_STEP)
        } else if chord(VirtualKey::RBRACKET) {
            Some(TUNING_STEP)
        } else {
            None
        };
        if let Some(delta) = radius_delta {
            let value = if pitch {
                self.controller.adjust_radius(delta)
            } else {
                self.controller.live().read(|c| c.pitch_radius)
            };
            self.show(&format!("Pitch Radius: {value:.2}"), overlay_ticks);
        }
    }

    /// Control toggle, pose reset and presets. Returns the overlay message
    /// of the last preset whose store key was held.
    fn check_user_settings(&mut self, frame: &InputFrame<'_>, sleep_max: u32) -> Option<String> {
        let live = Arc::clone(self.controller.live());
        let (toggle_key, toggle_type, reset_key) = live.read(|c| {
            (c.ctrl_toggle_key.clone(), c.ctrl_toggle_type, c.pose_reset_key.clone())
        });

        if let Some(enabled) =
            self.control_toggle
                .check(frame, &toggle_key, toggle_type, &self.controller, sleep_max)
        {
            info!(enabled, "Analog controls toggled");
        }

        if self.pose_reset.trigger(reset_key.is_pressed(frame), sleep_max) {
            live.request_pose_reset();
            debug!("Pose reset requested");
        }

        self.presets.sync(&live);
        let events = self
            .presets
            .check_user_bindings(frame, &self.controller, sleep_max);

        let mut message = None;
        for event in &events {
            if let PresetEvent::Stored { index, load_key } = event {
                debug!(preset = index, "Preset updated from live values");
                self.feedback.cue(Cue::Success);
                message = Some(format!("Hotkey {load_key} updated"));
            }
        }
        if message.is_some() && !self.presets.write_back(&live) {
            debug!("Profile changed under preset update, discarding");
        }
        message
    }

    /// Ctrl+navigation keys nudge the pose origin, one axis per tick:
    /// Home/End forward/back, Delete/PageDown left/right, PageUp/Insert yaw,
    /// Shift+PageUp/PageDown height.
    fn check_position_input(&self, frame: &InputFrame<'_>, ctrl: bool, shift: bool) -> Option<String> {
        if !ctrl {
            return None;
        }
        let down = |key: VirtualKey| frame.is_key_down(key);

        let (axis, delta) = if down(VirtualKey::HOME) {
            (OriginAxis::Y, -POSITION_STEP)
        } else if down(VirtualKey::END) {
            (OriginAxis::Y, POSITION_STEP)
        } else if down(VirtualKey::DELETE) {
            (OriginAxis::X, -POSITION_STEP)
        } else if down(VirtualKey::PAGE_DOWN) {
            if shift {
                (OriginAxis::Height, -POSITION_STEP)
            } else {
                (OriginAxis::X, POSITION_STEP)
            }
        } else if down(VirtualKey::PAGE_UP) {
            if shift {
                (OriginAxis::Height, POSITION_STEP)
            } else {
                (OriginAxis::Yaw, -YAW_STEP)
            }
        } else if down(VirtualKey::INSERT) {
            (OriginAxis::Yaw, YAW_STEP)
        } else {
            return None;
        };

        self.controller.nudge_origin(axis, delta);
        let (x, y, z, yaw) = self
            .controller
            .live()
            .read(|c| (c.hmd_x, c.hmd_y, c.hmd_height, c.hmd_yaw));
        Some(format!("Pos X:{x:.2} Y:{y:.2} Z:{z:.2} Yaw:{yaw:.2}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{RecordingFeedback, RecordingHost, ScriptedInput, open_gate};
    use crate::session::ProcessEvent;
    use crate::shared::LiveConfig;
    use openstereo_input::BindType;
    use openstereo_profile::{ProfileStore, StereoConfig, UserPreset};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    struct Fixture {
        _dir: tempfile::TempDir,
        input: ScriptedInput,
        feedback: Arc<RecordingFeedback>,
        controller: Arc<ParameterController>,
        session: Arc<ProfileSession>,
        worker: HotkeyWorker,
    }

    impl Fixture {
        fn tick(&mut self) {
            self.worker.tick(&InputFrame::capture(&self.input));
        }

        fn live(&self) -> &LiveConfig {
            self.controller.live()
        }
    }

    fn fixture(config: StereoConfig) -> Result<Fixture, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = ProfileStore::new(dir.path());
        store.ensure_default_profile()?;
        let counters = Arc::new(DriverCounters::new());
        let gate = open_gate(Arc::new(RecordingHost::new()), Arc::clone(&counters));
        let controller = Arc::new(ParameterController::new(
            Arc::new(LiveConfig::new(config)),
            gate,
            Arc::clone(&counters),
        ));
        let feedback = Arc::new(RecordingFeedback::new());
        let feedback_dyn: Arc<dyn UserFeedback> = Arc::clone(&feedback) as Arc<dyn UserFeedback>;
        let session = Arc::new(ProfileSession::new(
            store,
            Arc::clone(&controller),
            Arc::clone(&feedback_dyn),
            counters,
        ));
        Ok(Fixture {
            worker: HotkeyWorker::new(Arc::clone(&controller), Arc::clone(&session), feedback_dyn),
            _dir: dir,
            input: ScriptedInput::new(),
            feedback,
            controller,
            session,
        })
    }

    #[test]
    fn period_is_one_frame_in_whole_millis() {
        assert_eq!(hotkey_period(60.0), Duration::from_millis(16));
        assert_eq!(hotkey_period(144.0), Duration::from_millis(6));
        assert_eq!(hotkey_period(5000.0), Duration::from_millis(1));
        assert_eq!(hotkey_period(0.0), Duration::from_millis(1));
    }

    #[test]
    fn depth_keys_repeat_while_held() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::F4);
        for _ in 0..10 {
            f.tick();
        }
        assert!((f.live().depth() - 0.41).abs() < 1e-5);
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Depth: 0.410 Conv: 4.000"));
        Ok(())
    }

    #[test]
    fn f5_raises_and_f6_lowers_convergence() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::F5);
        f.tick();
        assert!((f.live().convergence() - 4.005).abs() < 1e-5);
        f.input.release(VirtualKey::F5);
        f.input.press(VirtualKey::F6);
        f.tick();
        f.tick();
        assert!((f.live().convergence() - 3.995).abs() < 1e-5);
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Depth: 0.400 Conv: 3.995"));
        Ok(())
    }

    #[test]
    fn hotkeys_need_ctrl_and_respect_disable() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.input.press(VirtualKey::F3);
        f.tick();
        assert_eq!(f.live().depth().to_bits(), 0.4_f32.to_bits());

        let mut f = fixture(StereoConfig {
            disable_hotkeys: true,
            ..StereoConfig::default()
        })?;
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::F3);
        f.tick();
        assert_eq!(f.live().depth().to_bits(), 0.4_f32.to_bits());
        assert!(f.feedback.overlays().is_empty());
        Ok(())
    }

    #[test]
    fn save_without_application_fails() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::F7);
        f.tick();
        f.tick();
        assert_eq!(f.feedback.cues(), vec![Cue::Failure]);
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Failed to save profile"));
        Ok(())
    }

    #[test]
    fn save_then_reload_round_trips_through_disk() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.session.on_process_event(&ProcessEvent::Connected {
            name: "game".to_owned(),
        });
        f.feedback.clear();

        f.controller.adjust_depth(0.3, false);
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::F7);
        f.tick();
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Saved game_config.json profile"));
        f.input.release(VirtualKey::F7);

        f.controller.adjust_depth(0.9, false);
        let sleep_max = f.live().read(|c| c.sleep_count_max());
        for _ in 0..sleep_max {
            f.tick();
        }
        f.input.press(VirtualKey::F10);
        f.tick();
        assert_eq!(f.live().depth().to_bits(), 0.3_f32.to_bits());
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Loaded game_config.json profile"));
        assert_eq!(f.feedback.cues(), vec![Cue::Success, Cue::Success]);
        Ok(())
    }

    #[test]
    fn f11_toggles_auto_depth_once_per_window() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::F11);
        f.tick();
        f.tick();
        assert!(!f.live().auto_depth_enabled());
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Auto Depth Off"));
        Ok(())
    }

    #[test]
    fn f9_writes_offsets_to_default_profile() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.controller.nudge_origin(OriginAxis::X, 0.5);
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::F9);
        f.tick();
        let saved = f.session.store().load_default_profile()?;
        assert!((saved.hmd_x - 0.5).abs() < 1e-6);
        assert_eq!(f.feedback.cues(), vec![Cue::Success]);
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Saved HMD Offsets"));
        Ok(())
    }

    #[test]
    fn sensitivity_only_moves_with_analog_controls() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::OEM_PLUS);
        f.tick();
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Ctrl Sensitivity: 1.00"));

        let mut f = fixture(StereoConfig {
            yaw_enable: true,
            ..StereoConfig::default()
        })?;
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::OEM_PLUS);
        f.tick();
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Ctrl Sensitivity: 1.01"));

        f.input.release(VirtualKey::OEM_PLUS);
        f.input.press(VirtualKey::RBRACKET);
        f.tick();
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Pitch Radius: 0.00"));
        Ok(())
    }

    fn nudge(f: &mut Fixture, keys: &[VirtualKey]) -> Option<String> {
        f.input.release_all();
        f.input.press(VirtualKey::CONTROL);
        for key in keys {
            f.input.press(*key);
        }
        f.tick();
        f.feedback.last_overlay()
    }

    #[test]
    fn position_keys_move_one_axis() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        // Home wins over PageUp
        assert_eq!(
            nudge(&mut f, &[VirtualKey::PAGE_UP, VirtualKey::HOME]).as_deref(),
            Some("Pos X:0.00 Y:-0.01 Z:1.00 Yaw:0.00")
        );
        // Shift does not change Home/End
        assert_eq!(
            nudge(&mut f, &[VirtualKey::SHIFT, VirtualKey::END]).as_deref(),
            Some("Pos X:0.00 Y:0.00 Z:1.00 Yaw:0.00")
        );
        assert_eq!(
            nudge(&mut f, &[VirtualKey::PAGE_DOWN]).as_deref(),
            Some("Pos X:0.01 Y:0.00 Z:1.00 Yaw:0.00")
        );
        assert_eq!(
            nudge(&mut f, &[VirtualKey::DELETE]).as_deref(),
            Some("Pos X:0.00 Y:0.00 Z:1.00 Yaw:0.00")
        );
        Ok(())
    }

    #[test]
    fn page_up_and_insert_turn_while_shift_page_keys_lift() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        assert_eq!(
            nudge(&mut f, &[VirtualKey::PAGE_UP]).as_deref(),
            Some("Pos X:0.00 Y:0.00 Z:1.00 Yaw:-0.10")
        );
        nudge(&mut f, &[VirtualKey::INSERT]);
        assert_eq!(
            nudge(&mut f, &[VirtualKey::INSERT]).as_deref(),
            Some("Pos X:0.00 Y:0.00 Z:1.00 Yaw:0.10")
        );
        assert_eq!(
            nudge(&mut f, &[VirtualKey::SHIFT, VirtualKey::PAGE_UP]).as_deref(),
            Some("Pos X:0.00 Y:0.00 Z:1.01 Yaw:0.10")
        );
        nudge(&mut f, &[VirtualKey::SHIFT, VirtualKey::PAGE_DOWN]);
        assert_eq!(
            nudge(&mut f, &[VirtualKey::SHIFT, VirtualKey::PAGE_DOWN]).as_deref(),
            Some("Pos X:0.00 Y:0.00 Z:0.99 Yaw:0.10")
        );
        Ok(())
    }

    #[test]
    fn preset_store_message_beats_position_message() -> TestResult {
        let mut f = fixture(StereoConfig {
            user_settings: vec![UserPreset::new("VK_NUMPAD1", "VK_CONTROL", BindType::Toggle, 0.1, 1.0)],
            ..StereoConfig::default()
        })?;
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::INSERT);
        f.tick();
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("Hotkey VK_NUMPAD1 updated"));
        let stored = f.live().read(|c| c.user_settings.first().map(|p| p.depth.to_bits()));
        assert_eq!(stored, Some(0.4_f32.to_bits()));
        Ok(())
    }

    #[test]
    fn pose_reset_key_is_debounced() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.input.press(VirtualKey(0x67));
        f.tick();
        assert!(f.live().take_pose_reset());
        f.tick();
        assert!(!f.live().take_pose_reset());
        Ok(())
    }

    #[test]
    fn overlay_counts_down_and_stops() -> TestResult {
        let mut f = fixture(StereoConfig {
            display_frequency: 1.0,
            ..StereoConfig::default()
        })?;
        // 1 Hz: sleep_count_max 1, overlay held 3 ticks
        f.input.press(VirtualKey::CONTROL);
        f.input.press(VirtualKey::F11);
        f.tick();
        f.input.release_all();
        for _ in 0..5 {
            f.tick();
        }
        assert_eq!(f.feedback.overlays().len(), 3);
        assert_eq!(f.worker.overlay().1, 0);
        Ok(())
    }

    #[test]
    fn connect_notice_shows_on_next_tick() -> TestResult {
        let mut f = fixture(StereoConfig::default())?;
        f.session.on_process_event(&ProcessEvent::Connected {
            name: "nothing".to_owned(),
        });
        f.tick();
        assert_eq!(f.feedback.last_overlay().as_deref(), Some("No profile found for nothing"));
        Ok(())
    }
}
