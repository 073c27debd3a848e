//! Load-time validation.
//!
//! Bad numbers in a profile are corrected rather than rejected: each field
//! that fails its rule is replaced (or clamped) and reported once, and the
//! rest of the profile is used as written.

use openstereo_errors::ValidationError;
use tracing::warn;

use crate::MIN_CONVERGENCE;
use crate::config::StereoConfig;

impl StereoConfig {
    /// Correct out-of-range fields in place and derive the render size.
    ///
    /// Returns one [`ValidationError`] per corrected field.
    pub fn sanitize(&mut self) -> Vec<ValidationError> {
        let defaults = StereoConfig::default();
        let mut report = Vec::new();

        positive("aspect_ratio", &mut self.aspect_ratio, defaults.aspect_ratio, &mut report);
        positive(
            "display_frequency",
            &mut self.display_frequency,
            defaults.display_frequency,
            &mut report,
        );

        if !self.fov.is_finite() {
            report.push(ValidationError::not_finite("fov"));
            self.fov = defaults.fov;
        } else if self.fov <= 0.0 || self.fov >= 180.0 {
            report.push(ValidationError::out_of_range("fov", self.fov, 0.0, 180.0));
            self.fov = defaults.fov;
        }

        if !self.display_latency.is_finite() {
            report.push(ValidationError::not_finite("display_latency"));
            self.display_latency = defaults.display_latency;
        } else if self.display_latency < 0.0 {
            report.push(ValidationError::out_of_range(
                "display_latency",
                self.display_latency,
                0.0,
                f32::MAX,
            ));
            self.display_latency = defaults.display_latency;
        }

        if !self.ctrl_deadzone.is_finite() {
            report.push(ValidationError::not_finite("ctrl_deadzone"));
            self.ctrl_deadzone = defaults.ctrl_deadzone;
        } else if !(0.0..1.0).contains(&self.ctrl_deadzone) {
            report.push(ValidationError::out_of_range(
                "ctrl_deadzone",
                self.ctrl_deadzone,
                0.0,
                1.0,
            ));
            self.ctrl_deadzone = defaults.ctrl_deadzone;
        }

        floor_at("depth", &mut self.depth, 0.0, defaults.depth, &mut report);
        floor_at(
            "convergence",
            &mut self.convergence,
            MIN_CONVERGENCE,
            defaults.convergence,
            &mut report,
        );
        floor_at(
            "ctrl_sensitivity",
            &mut self.ctrl_sensitivity,
            0.0,
            defaults.ctrl_sensitivity,
            &mut report,
        );
        floor_at(
            "pitch_radius",
            &mut self.pitch_radius,
            0.0,
            defaults.pitch_radius,
            &mut report,
        );

        for (field, value, default) in [
            ("hmd_height", &mut self.hmd_height, defaults.hmd_height),
            ("hmd_x", &mut self.hmd_x, defaults.hmd_x),
            ("hmd_y", &mut self.hmd_y, defaults.hmd_y),
            ("hmd_yaw", &mut self.hmd_yaw, defaults.hmd_yaw),
        ] {
            if !value.is_finite() {
                report.push(ValidationError::not_finite(field));
                *value = default;
            }
        }

        for (field, value, default) in [
            ("window_width", &mut self.window_width, defaults.window_width),
            ("window_height", &mut self.window_height, defaults.window_height),
        ] {
            if *value == 0 {
                report.push(ValidationError::non_positive(field, *value));
                *value = default;
            }
        }

        for (index, preset) in self.user_settings.iter_mut().enumerate() {
            if !preset.depth.is_finite() || preset.depth < 0.0 {
                report.push(ValidationError::out_of_range(
                    format!("user_settings[{index}].depth"),
                    preset.depth,
                    0.0,
                    f32::MAX,
                ));
                preset.depth = if preset.depth.is_finite() { 0.0 } else { defaults.depth };
            }
            if !preset.convergence.is_finite() || preset.convergence < MIN_CONVERGENCE {
                report.push(ValidationError::out_of_range(
                    format!("user_settings[{index}].convergence"),
                    preset.convergence,
                    MIN_CONVERGENCE,
                    f32::MAX,
                ));
                preset.convergence = if preset.convergence.is_finite() {
                    MIN_CONVERGENCE
                } else {
                    defaults.convergence
                };
            }
        }

        self.update_render_size();
        report
    }

    /// [`sanitize`](Self::sanitize), logging each correction.
    pub fn sanitize_and_log(&mut self, profile: &str) {
        for issue in self.sanitize() {
            warn!(profile, field = issue.field(), error = %issue, "Corrected profile value");
        }
    }
}

fn positive(field: &str, value: &mut f32, default: f32, report: &mut Vec<ValidationError>) {
    if !value.is_finite() {
        report.push(ValidationError::not_finite(field));
        *value = default;
    } else if *value <= 0.0 {
        report.push(ValidationError::non_positive(field, *value));
        *value = default;
    }
}

fn floor_at(field: &str, value: &mut f32, min: f32, default: f32, report: &mut Vec<ValidationError>) {
    if !value.is_finite() {
        report.push(ValidationError::not_finite(field));
        *value = default;
    } else if *value < min {
        report.push(ValidationError::out_of_range(field, *value, min, f32::MAX));
        *value = min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_clean() {
        let mut config = StereoConfig::default();
        assert!(config.sanitize().is_empty());
        assert_eq!(config, StereoConfig::default());
    }

    #[test]
    fn bad_geometry_falls_back() {
        let mut config = StereoConfig {
            aspect_ratio: -1.0,
            fov: 180.0,
            display_frequency: f32::NAN,
            ..StereoConfig::default()
        };
        let report = config.sanitize();
        let fields: Vec<&str> = report.iter().map(ValidationError::field).collect();
        assert_eq!(fields, ["aspect_ratio", "display_frequency", "fov"]);
        assert_eq!(config.aspect_ratio.to_bits(), 1.77778_f32.to_bits());
        assert_eq!(config.fov.to_bits(), 90.0_f32.to_bits());
        assert_eq!(config.display_frequency.to_bits(), 60.0_f32.to_bits());
    }

    #[test]
    fn stereo_values_are_clamped_not_reset() {
        let mut config = StereoConfig {
            depth: -2.0,
            convergence: 0.0,
            ctrl_deadzone: 1.0,
            ..StereoConfig::default()
        };
        let report = config.sanitize();
        assert_eq!(report.len(), 3);
        assert_eq!(config.depth.to_bits(), 0.0_f32.to_bits());
        assert_eq!(config.convergence.to_bits(), MIN_CONVERGENCE.to_bits());
        assert_eq!(config.ctrl_deadzone.to_bits(), 0.05_f32.to_bits());
    }

    #[test]
    fn preset_values_are_clamped() {
        let mut config = StereoConfig::default();
        if let Some(preset) = config.user_settings.first_mut() {
            preset.convergence = -3.0;
        }
        let report = config.sanitize();
        assert_eq!(report.len(), 1);
        assert_eq!(
            config.user_settings.first().map(|p| p.convergence.to_bits()),
            Some(MIN_CONVERGENCE.to_bits())
        );
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut config = StereoConfig {
            window_width: 0,
            ..StereoConfig::default()
        };
        let report = config.sanitize();
        assert_eq!(report.first().map(ValidationError::field), Some("window_width"));
        assert_eq!(config.render_width, 960);
    }
}
