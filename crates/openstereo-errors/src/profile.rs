//! Profile error types.
//!
//! Profiles are JSON documents stored one per application. Every variant here
//! is recoverable: the caller keeps the configuration it already has and
//! reports the failure to the user.

use crate::severity::ErrorSeverity;

/// Profile load/save errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    /// No profile file exists for the requested name
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// The profile file exists but could not be parsed
    #[error("Invalid profile format in {path}: {reason}")]
    InvalidFormat {
        /// Path to the offending file
        path: String,
        /// Parser message
        reason: String,
    },

    /// Writing the profile failed
    #[error("Failed to save profile {profile}: {reason}")]
    SaveFailed {
        /// Profile name
        profile: String,
        /// Underlying failure
        reason: String,
    },

    /// Reading the profile failed for a reason other than absence
    #[error("Failed to load profile from {path}: {reason}")]
    LoadFailed {
        /// Path to the file
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Profile names become file names, so path separators are rejected
    #[error("Invalid profile name: {0}")]
    InvalidName(String),
}

impl ProfileError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ProfileError::NotFound(_) => ErrorSeverity::Warning,
            ProfileError::InvalidFormat { .. } => ErrorSeverity::Error,
            ProfileError::SaveFailed { .. } => ErrorSeverity::Error,
            ProfileError::LoadFailed { .. } => ErrorSeverity::Error,
            ProfileError::InvalidName(_) => ErrorSeverity::Error,
        }
    }

    /// Check if this error is related to profile storage.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            ProfileError::SaveFailed { .. } | ProfileError::LoadFailed { .. }
        )
    }

    /// Create a not found error.
    pub fn not_found(profile: impl Into<String>) -> Self {
        ProfileError::NotFound(profile.into())
    }

    /// Create an invalid format error.
    pub fn invalid_format(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ProfileError::InvalidFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a save failure.
    pub fn save_failed(profile: impl Into<String>, reason: impl Into<String>) -> Self {
        ProfileError::SaveFailed {
            profile: profile.into(),
            reason: reason.into(),
        }
    }

    /// Create a load failure.
    pub fn load_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ProfileError::LoadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
