//! Per-application profile switching.
//!
//! Tracks which application the host reported last and which profile file
//! the hotkeys save to and reload from. Profile I/O runs on the caller's
//! thread: the host event thread for process events, the hotkey thread for
//! Ctrl+F7/F9/F10. Neither is the pose thread.

use std::sync::Arc;

use openstereo_atomic::DriverCounters;
use openstereo_errors::{ErrorSeverity, ProfileError};
use openstereo_profile::{DEFAULT_PROFILE, PROFILE_FILE_SUFFIX, ProfileStore};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::controller::ParameterController;
use crate::feedback::{Cue, UserFeedback};

/// Application lifecycle events forwarded by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Connected { name: String },
    Disconnected { name: String },
}

/// Outcome of a process-connect load, shown by the hotkey thread on its
/// next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileNotice {
    Loaded { profile: String },
    Missing { app: String },
}

impl ProfileNotice {
    pub fn message(&self) -> String {
        match self {
            Self::Loaded { profile } => format!("Loaded {} profile", file_name(profile)),
            Self::Missing { app } => format!("No profile found for {app}"),
        }
    }
}

/// `<name>_config.json`
pub fn file_name(profile: &str) -> String {
    format!("{profile}{PROFILE_FILE_SUFFIX}")
}

#[derive(Debug, Default)]
struct SessionState {
    /// Application whose profile is applied, if any
    current_app: Option<String>,
    /// Last application that connected; target of save and reload
    last_app: Option<String>,
    notice: Option<ProfileNotice>,
}

/// Profile switching between the default and per-application profiles.
pub struct ProfileSession {
    store: ProfileStore,
    controller: Arc<ParameterController>,
    feedback: Arc<dyn UserFeedback>,
    counters: Arc<DriverCounters>,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for ProfileSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileSession")
            .field("store", &self.store)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl ProfileSession {
    pub fn new(
        store: ProfileStore,
        controller: Arc<ParameterController>,
        feedback: Arc<dyn UserFeedback>,
        counters: Arc<DriverCounters>,
    ) -> Self {
        Self {
            store,
            controller,
            feedback,
            counters,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Application whose profile is currently applied.
    pub fn current_app(&self) -> Option<String> {
        self.state.lock().current_app.clone()
    }

    /// Take the pending connect notice, if any.
    pub fn take_notice(&self) -> Option<ProfileNotice> {
        self.state.lock().notice.take()
    }

    /// React to an application starting or stopping.
    ///
    /// A connect of an application that is not already tracked loads its
    /// profile; when there is none the current config stays. A disconnect of
    /// the tracked application falls back to the default profile.
    pub fn on_process_event(&self, event: &ProcessEvent) {
        match event {
            ProcessEvent::Connected { name } => {
                {
                    let mut state = self.state.lock();
                    if state.current_app.as_deref() == Some(name.as_str()) {
                        return;
                    }
                    state.current_app = Some(name.clone());
                    state.last_app = Some(name.clone());
                }

                let notice = match self.load(name) {
                    Ok(()) => {
                        info!(app = %name, "Loaded application profile");
                        self.feedback.cue(Cue::Success);
                        ProfileNotice::Loaded {
                            profile: name.clone(),
                        }
                    }
                    Err(e) => {
                        if e.severity() > ErrorSeverity::Warning {
                            warn!(
                                app = %name,
                                error = %e,
                                severity = %e.severity(),
                                "Application profile unusable"
                            );
                        } else {
                            info!(app = %name, reason = %e, "No profile for application");
                        }
                        self.feedback.cue(Cue::Failure);
                        ProfileNotice::Missing { app: name.clone() }
                    }
                };
                self.state.lock().notice = Some(notice);
            }
            ProcessEvent::Disconnected { name } => {
                {
                    let mut state = self.state.lock();
                    if state.current_app.as_deref() != Some(name.as_str()) {
                        return;
                    }
                    state.current_app = None;
                }
                match self.load(DEFAULT_PROFILE) {
                    Ok(()) => info!(app = %name, "Application exited, default profile restored"),
                    Err(e) => warn!(app = %name, error = %e, "Failed to restore default profile"),
                }
            }
        }
    }

    /// Save the live profile keys into the last connected application's
    /// profile.
    ///
    /// Returns the profile name written, or `None` if no application has
    /// connected yet.
    ///
    /// # Errors
    ///
    /// Propagates [`ProfileStore::save_profile_keys`] failures.
    pub fn save_current(&self) -> Result<Option<String>, ProfileError> {
        let Some(app) = self.state.lock().last_app.clone() else {
            return Ok(None);
        };
        let snapshot = self.controller.live().snapshot();
        self.store.save_profile_keys(&app, &snapshot)?;
        Ok(Some(app))
    }

    /// Reload the last connected application's profile, or the default
    /// profile when `use_default` is set.
    ///
    /// Returns the profile name applied, or `None` if there was nothing to
    /// reload.
    ///
    /// # Errors
    ///
    /// Propagates [`ProfileStore::load_layered`] failures; the live config
    /// is left unchanged.
    pub fn reload(&self, use_default: bool) -> Result<Option<String>, ProfileError> {
        let target = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if use_default {
                state.current_app = None;
                Some(DEFAULT_PROFILE.to_owned())
            } else {
                state.current_app.clone_from(&state.last_app);
                state.last_app.clone()
            }
        };
        let Some(profile) = target else {
            return Ok(None);
        };
        self.load(&profile)?;
        Ok(Some(profile))
    }

    /// Write the live pose offsets into the default profile.
    ///
    /// # Errors
    ///
    /// Propagates [`ProfileStore::save_hmd_offsets`] failures.
    pub fn save_hmd_offsets(&self) -> Result<(), ProfileError> {
        let snapshot = self.controller.live().snapshot();
        self.store.save_hmd_offsets(&snapshot)
    }

    fn load(&self, profile: &str) -> Result<(), ProfileError> {
        let current = self.controller.live().snapshot();
        match self.store.load_layered(profile, &current) {
            Ok(config) => {
                self.controller.apply_config(config);
                self.controller.live().set_active_profile(profile);
                Ok(())
            }
            Err(e) => {
                self.counters.inc_profile_load_failure();
                Err(e)
            }
        }
    }
}
