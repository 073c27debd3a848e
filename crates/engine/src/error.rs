//! Driver lifecycle errors.

use openstereo_errors::{ErrorSeverity, ProfileError};
use thiserror::Error;

/// Failures of [`StereoDriver`](crate::StereoDriver) lifecycle calls.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Driver is already active on device {0}")]
    AlreadyActive(u32),

    #[error("Failed to spawn {thread} thread: {reason}")]
    ThreadSpawn { thread: &'static str, reason: String },

    #[error("{count} worker thread(s) panicked")]
    WorkerPanicked { count: usize },

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl DriverError {
    /// Severity for logging.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyActive(_) => ErrorSeverity::Warning,
            Self::ThreadSpawn { .. } | Self::WorkerPanicked { .. } => ErrorSeverity::Critical,
            Self::Profile(e) => e.severity(),
        }
    }

    pub(crate) fn thread_spawn(thread: &'static str, e: &std::io::Error) -> Self {
        Self::ThreadSpawn {
            thread,
            reason: e.to_string(),
        }
    }
}

/// Result alias for driver operations.
pub type DriverResult<T = ()> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_failure_is_critical() {
        let io = std::io::Error::other("no threads left");
        let err = DriverError::thread_spawn("pose", &io);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.to_string(), "Failed to spawn pose thread: no threads left");
    }

    #[test]
    fn profile_errors_keep_their_severity() {
        let err = DriverError::from(ProfileError::not_found("hl2"));
        assert_eq!(err.severity(), ProfileError::not_found("hl2").severity());
    }
}
