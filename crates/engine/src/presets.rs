//! User preset and control-toggle bindings.
//!
//! Evaluated once per hotkey tick. The hotkey thread owns a [`PresetBank`]
//! holding its own copy of the preset list, so per-preset runtime state never
//! needs a lock. The copy is refreshed whenever a profile load bumps the
//! config generation.

use openstereo_input::{BindType, BoundKey, InputFrame};
use openstereo_profile::UserPreset;
use tracing::debug;

use crate::controller::ParameterController;
use crate::debounce::Debounce;
use crate::shared::LiveConfig;

/// What a preset did this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetEvent {
    /// The preset's depth/convergence were applied
    Applied { index: usize },
    /// The values from before the preset were put back
    Restored { index: usize },
    /// The live values were captured into the preset
    Stored { index: usize, load_key: String },
}

/// The hotkey thread's working copy of the preset list.
#[derive(Debug, Default)]
pub struct PresetBank {
    generation: Option<u64>,
    presets: Vec<UserPreset>,
}

impl PresetBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presets(&self) -> &[UserPreset] {
        &self.presets
    }

    /// Reload the list if the live config was replaced since the last sync.
    pub fn sync(&mut self, live: &LiveConfig) {
        if self.generation == Some(live.generation()) {
            return;
        }
        let (generation, presets) = live.presets();
        debug!(generation, count = presets.len(), "Reloaded preset bindings");
        self.generation = Some(generation);
        self.presets = presets;
    }

    /// Store the working copy back into the live config unless a profile
    /// load replaced it in the meantime.
    pub fn write_back(&self, live: &LiveConfig) -> bool {
        match self.generation {
            Some(generation) => live.write_back_presets(generation, &self.presets),
            None => false,
        }
    }

    /// Evaluate every preset against `frame`.
    ///
    /// - SWITCH applies its values on every tick the load key is held.
    /// - TOGGLE fires at most once per `sleep_count_max` ticks: if the live
    ///   values already equal the preset, the previous values are restored,
    ///   otherwise they are saved and the preset applied.
    /// - HOLD applies on the press edge and restores on the release edge.
    ///
    /// A held store key copies the live values into the preset every tick.
    pub fn check_user_bindings(
        &mut self,
        frame: &InputFrame<'_>,
        controller: &ParameterController,
        sleep_count_max: u32,
    ) -> Vec<PresetEvent> {
        let live = controller.live();
        let mut events = Vec::new();

        for (index, preset) in self.presets.iter_mut().enumerate() {
            preset.runtime.sleep_count = preset.runtime.sleep_count.saturating_sub(1);

            if preset.load_key.is_pressed(frame) {
                match preset.bind_type {
                    BindType::Hold => {
                        if !preset.runtime.was_held {
                            preset.runtime.prev_depth = live.depth();
                            preset.runtime.prev_convergence = live.convergence();
                            preset.runtime.was_held = true;
                            apply(controller, preset.depth, preset.convergence);
                            events.push(PresetEvent::Applied { index });
                        }
                    }
                    BindType::Toggle => {
                        if preset.runtime.sleep_count == 0 {
                            preset.runtime.sleep_count = sleep_count_max;
                            let active = live.depth_cell().bits_eq(preset.depth)
                                && live.convergence_cell().bits_eq(preset.convergence);
                            if active {
                                apply(
                                    controller,
                                    preset.runtime.prev_depth,
                                    preset.runtime.prev_convergence,
                                );
                                events.push(PresetEvent::Restored { index });
                            } else {
                                preset.runtime.prev_depth = live.depth();
                                preset.runtime.prev_convergence = live.convergence();
                                apply(controller, preset.depth, preset.convergence);
                                events.push(PresetEvent::Applied { index });
                            }
                        }
                    }
                    BindType::Switch => {
                        apply(controller, preset.depth, preset.convergence);
                        events.push(PresetEvent::Applied { index });
                    }
                }
            } else if preset.bind_type == BindType::Hold && preset.runtime.was_held {
                preset.runtime.was_held = false;
                apply(
                    controller,
                    preset.runtime.prev_depth,
                    preset.runtime.prev_convergence,
                );
                events.push(PresetEvent::Restored { index });
            }

            if preset.store_key.is_pressed(frame) {
                preset.depth = live.depth();
                preset.convergence = live.convergence();
                events.push(PresetEvent::Stored {
                    index,
                    load_key: preset.load_key.token().to_owned(),
                });
            }
        }
        events
    }
}

fn apply(controller: &ParameterController, depth: f32, convergence: f32) {
    controller.adjust_depth(depth, false);
    controller.adjust_convergence(convergence, false);
}

/// The control-toggle binding: turns analog pitch/yaw on and off.
#[derive(Debug, Default)]
pub struct ControlToggle {
    debounce: Debounce,
    held: bool,
}

impl ControlToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the binding. Returns the new enablement if it changed.
    ///
    /// HOLD disables the controls while the key is down. TOGGLE and SWITCH
    /// flip them, at most once per `sleep_count_max` ticks.
    pub fn check(
        &mut self,
        frame: &InputFrame<'_>,
        key: &BoundKey,
        bind_type: BindType,
        controller: &ParameterController,
        sleep_count_max: u32,
    ) -> Option<bool> {
        let mut changed = None;
        if key.is_pressed(frame) {
            match bind_type {
                BindType::Hold => {
                    if !self.held {
                        self.held = true;
                        controller.set_controls_enabled(false);
                        changed = Some(false);
                    }
                }
                BindType::Toggle | BindType::Switch => {
                    if self.debounce.is_ready() {
                        self.debounce.arm(sleep_count_max);
                        let enabled = !controller.live().controls_enabled();
                        controller.set_controls_enabled(enabled);
                        changed = Some(enabled);
                    }
                }
            }
        } else if bind_type == BindType::Hold && self.held {
            self.held = false;
            controller.set_controls_enabled(true);
            changed = Some(true);
        }
        self.debounce.tick();
        changed
    }
}
