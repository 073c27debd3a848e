//! How loudly a failure should be reported.

use core::fmt;

/// Severity of an error, ordered from least to most serious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// A single sample was dropped
    Info = 0,
    /// A fallback value was used
    Warning = 1,
    /// The operation failed and the previous state was kept
    Error = 2,
    /// A worker is gone; the driver needs a restart
    Critical = 3,
}

impl ErrorSeverity {
    /// Whether the driver keeps running normally after such a failure.
    pub fn is_recoverable(self) -> bool {
        self < ErrorSeverity::Critical
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_runs_from_info_to_critical() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
        assert!(ErrorSeverity::Error.is_recoverable());
        assert!(!ErrorSeverity::Critical.is_recoverable());
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }
}
