//! Error types for the scheduler crate.

/// Scheduler construction errors.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    /// Tick period of zero
    #[error("Tick period must be non-zero")]
    ZeroPeriod,

    /// Frequency was zero, negative or not finite
    #[error("Tick frequency must be a positive finite number, got {0}")]
    InvalidFrequency(f32),
}

/// Scheduler result type
pub type SchedulerResult<T = ()> = Result<T, SchedulerError>;
