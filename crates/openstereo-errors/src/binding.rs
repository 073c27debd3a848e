//! Key binding resolution errors.

use crate::severity::ErrorSeverity;

/// Errors produced while turning a binding token such as `"VK_F5"` or
/// `"XINPUT_GAMEPAD_A+XINPUT_GAMEPAD_B"` into a runtime key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// The token matches neither a keyboard key nor a gamepad button
    #[error("Unknown key binding '{0}'")]
    UnknownToken(String),

    /// One element of a `+` chord is not a gamepad button
    #[error("Unknown gamepad button '{part}' in chord '{token}'")]
    UnknownChordPart {
        /// Full chord string
        token: String,
        /// Offending element
        part: String,
    },
}

impl BindingError {
    /// Bindings fall back to unbound, so these are warnings.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Warning
    }

    /// Create an unknown token error.
    pub fn unknown_token(token: impl Into<String>) -> Self {
        BindingError::UnknownToken(token.into())
    }

    /// Create an unknown chord element error.
    pub fn unknown_chord_part(token: impl Into<String>, part: impl Into<String>) -> Self {
        BindingError::UnknownChordPart {
            token: token.into(),
            part: part.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_error_display() {
        let err = BindingError::unknown_chord_part("XINPUT_GAMEPAD_A+FOO", "FOO");
        let msg = err.to_string();
        assert!(msg.contains("'FOO'"));
        assert!(msg.contains("XINPUT_GAMEPAD_A+FOO"));
    }
}
