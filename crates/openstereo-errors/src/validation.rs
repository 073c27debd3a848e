//! Field validation errors.
//!
//! Raised while sanitizing a freshly loaded configuration. The loader logs each
//! one and substitutes the default value for the field.

use core::fmt;

use crate::severity::ErrorSeverity;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Value out of range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// Value must be strictly positive
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
    },

    /// NaN or infinity
    #[error("{field} is not a finite number")]
    NotFinite {
        /// Field name
        field: String,
    },

    /// Invalid enum value
    #[error("Invalid value '{value}' for field '{field}', expected one of: {expected}")]
    InvalidEnumValue {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Expected values
        expected: String,
    },
}

impl ValidationError {
    /// Every validation failure is corrected with a default, so it is only a warning.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Warning
    }

    /// Name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::NonPositive { field, .. }
            | ValidationError::NotFinite { field }
            | ValidationError::InvalidEnumValue { field, .. } => field,
        }
    }

    /// Create an out of range error for a numeric value.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create a non-positive value error.
    pub fn non_positive<T: fmt::Debug>(field: impl Into<String>, value: T) -> Self {
        ValidationError::NonPositive {
            field: field.into(),
            value: format!("{value:?}"),
        }
    }

    /// Create a non-finite value error.
    pub fn not_finite(field: impl Into<String>) -> Self {
        ValidationError::NotFinite {
            field: field.into(),
        }
    }

    /// Create an invalid enum value error.
    pub fn invalid_enum(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidEnumValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}
