//! External orientation telemetry errors.

use crate::severity::ErrorSeverity;

/// Errors from the UDP orientation feed and the auto-depth channel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TelemetryError {
    /// Socket could not be bound; the receiver retries after a backoff
    #[error("Failed to bind port {port}: {reason}")]
    BindFailed {
        /// Requested port
        port: u16,
        /// OS error text
        reason: String,
    },

    /// Datagram had the wrong size
    #[error("Telemetry packet has wrong size: expected {expected}, got {actual}")]
    InvalidPacketSize {
        /// Required size
        expected: usize,
        /// Received size
        actual: usize,
    },

    /// Datagram carried NaN or infinity
    #[error("Telemetry packet field '{field}' is not finite")]
    NonFiniteValue {
        /// Field name
        field: &'static str,
    },
}

impl TelemetryError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TelemetryError::BindFailed { .. } => ErrorSeverity::Error,
            TelemetryError::InvalidPacketSize { .. } | TelemetryError::NonFiniteValue { .. } => {
                ErrorSeverity::Info
            }
        }
    }

    /// Whether the error concerns a single dropped sample.
    pub fn is_dropped_sample(&self) -> bool {
        matches!(
            self,
            TelemetryError::InvalidPacketSize { .. } | TelemetryError::NonFiniteValue { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_sample_classification() {
        let err = TelemetryError::InvalidPacketSize {
            expected: 48,
            actual: 40,
        };
        assert!(err.is_dropped_sample());
        assert_eq!(err.severity(), ErrorSeverity::Info);

        let err = TelemetryError::BindFailed {
            port: 4242,
            reason: "address in use".into(),
        };
        assert!(!err.is_dropped_sample());
    }
}
