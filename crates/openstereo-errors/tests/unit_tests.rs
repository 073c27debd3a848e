//! Display, classification and conversion tests for every error variant.

use openstereo_errors::{
    BindingError, ErrorSeverity, ProfileError, TelemetryError, ValidationError,
};

mod profile_error_tests {
    use super::*;

    #[test]
    fn test_all_variants_display() {
        let variants = vec![
            ProfileError::not_found("hl2"),
            ProfileError::invalid_format("hl2_config.json", "trailing comma"),
            ProfileError::save_failed("hl2", "read-only"),
            ProfileError::load_failed("hl2_config.json", "permission denied"),
            ProfileError::InvalidName("a/b".into()),
        ];
        for variant in variants {
            assert!(!variant.to_string().is_empty());
        }
    }

    #[test]
    fn test_not_found_snapshot() {
        insta::assert_snapshot!(ProfileError::not_found("hl2"), @"Profile not found: hl2");
    }
}

mod binding_error_tests {
    use super::*;

    #[test]
    fn test_unknown_token_snapshot() {
        insta::assert_snapshot!(
            BindingError::unknown_token("VK_BOGUS"),
            @"Unknown key binding 'VK_BOGUS'"
        );
    }
}

mod severity_tests {
    use super::*;

    #[test]
    fn test_severity_by_variant() {
        assert_eq!(ValidationError::not_finite("fov").severity(), ErrorSeverity::Warning);
        assert_eq!(
            TelemetryError::NonFiniteValue { field: "yaw" }.severity(),
            ErrorSeverity::Info
        );
        assert_eq!(ProfileError::not_found("hl2").severity(), ErrorSeverity::Warning);
        assert_eq!(
            ProfileError::invalid_format("hl2_config.json", "eof").severity(),
            ErrorSeverity::Error
        );
        assert_eq!(BindingError::unknown_token("VK_NOPE").severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_nothing_below_critical_stops_the_driver() {
        let err = TelemetryError::BindFailed {
            port: 4242,
            reason: "in use".into(),
        };
        assert!(err.severity().is_recoverable());
    }
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_validation_errors_name_their_field(field in "[a-z_]{1,24}", value in -1.0e6f32..0.0) {
            let err = ValidationError::non_positive(field.clone(), value);
            prop_assert_eq!(err.field(), field.as_str());
            prop_assert!(err.to_string().starts_with(&field));
        }
    }
}
