//! Audible cues and on-screen messages.
//!
//! The engine decides *when* the user should hear or see something; how a
//! cue sounds or where an overlay is drawn is up to the embedding process.

use tracing::{debug, info};

/// Outcome tone for a user-initiated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Success,
    Failure,
}

/// Sink for user-facing feedback.
pub trait UserFeedback: Send + Sync {
    /// Play the tone for `cue`.
    fn cue(&self, cue: Cue);

    /// Show `message`. Called once per hotkey tick for as long as the
    /// message is live.
    fn overlay(&self, message: &str);
}

/// Discards all feedback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedback;

impl UserFeedback for NullFeedback {
    fn cue(&self, _cue: Cue) {}

    fn overlay(&self, _message: &str) {}
}

/// Logs feedback instead of rendering it.
///
/// Overlays repeat every tick, so only a change of message is logged at
/// `info`; repeats go to `debug`.
#[derive(Debug, Default)]
pub struct TracingFeedback {
    last_overlay: parking_lot::Mutex<String>,
}

impl TracingFeedback {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserFeedback for TracingFeedback {
    fn cue(&self, cue: Cue) {
        match cue {
            Cue::Success => info!(cue = "success", "User feedback"),
            Cue::Failure => info!(cue = "failure", "User feedback"),
        }
    }

    fn overlay(&self, message: &str) {
        let mut last = self.last_overlay.lock();
        if *last == message {
            debug!(message, "Overlay");
        } else {
            info!(message, "Overlay");
            message.clone_into(&mut *last);
        }
    }
}
