//! Analog stick deadzone.

/// Rescale an axis value through a radial deadzone.
///
/// Inputs inside `deadzone` return 0. Outside it, the remaining travel is
/// stretched so the boundary maps to 0 and full deflection maps to ±1.
/// The input is clamped to `[-1, 1]` first. A deadzone of 1 or more swallows
/// the whole axis; a negative one is treated as zero.
///
/// ```
/// use openstereo_input::apply_deadzone;
///
/// assert_eq!(apply_deadzone(0.04, 0.05), 0.0);
/// assert_eq!(apply_deadzone(1.0, 0.05), 1.0);
/// assert_eq!(apply_deadzone(-1.0, 0.05), -1.0);
/// ```
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let deadzone = if deadzone.is_finite() { deadzone.max(0.0) } else { 0.0 };
    if deadzone >= 1.0 {
        return 0.0;
    }
    let value = value.clamp(-1.0, 1.0);
    let magnitude = value.abs();
    if magnitude < deadzone {
        return 0.0;
    }
    let scaled = ((magnitude - deadzone) / (1.0 - deadzone)).min(1.0);
    scaled.copysign(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn boundary_maps_to_zero() {
        assert!(close(apply_deadzone(0.25, 0.25), 0.0));
        assert!(close(apply_deadzone(-0.25, 0.25), 0.0));
    }

    #[test]
    fn midpoint_is_linear() {
        assert!(close(apply_deadzone(0.5, 0.0), 0.5));
        assert!(close(apply_deadzone(0.6, 0.2), 0.5));
        assert!(close(apply_deadzone(-0.6, 0.2), -0.5));
    }

    #[test]
    fn degenerate_deadzones() {
        assert!(close(apply_deadzone(0.9, 1.0), 0.0));
        assert!(close(apply_deadzone(0.5, -3.0), 0.5));
        assert!(close(apply_deadzone(2.0, 0.1), 1.0));
        assert!(close(apply_deadzone(f32::NAN, 0.1), 0.0));
    }
}
