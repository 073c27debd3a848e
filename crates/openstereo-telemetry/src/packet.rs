//! Datagram layout.
//!
//! Six IEEE-754 doubles, little-endian, no header:
//! `X(0) Y(8) Z(16) Yaw(24) Pitch(32) Roll(40)`. Positions are ignored by the
//! driver; angles are degrees.

use glam::Quat;
use openstereo_errors::TelemetryError;

/// Exact datagram size.
pub const PACKET_SIZE: usize = 48;

const OFF_X: usize = 0;
const OFF_Y: usize = 8;
const OFF_Z: usize = 16;
const OFF_YAW: usize = 24;
const OFF_PITCH: usize = 32;
const OFF_ROLL: usize = 40;

/// One decoded sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OpenTrackSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl OpenTrackSample {
    /// Orientation as `yaw(Y) * pitch(X) * roll(Z)`.
    pub fn orientation(&self) -> Quat {
        let yaw = Quat::from_rotation_y(self.yaw.to_radians() as f32);
        let pitch = Quat::from_rotation_x(self.pitch.to_radians() as f32);
        let roll = Quat::from_rotation_z(self.roll.to_radians() as f32);
        (yaw * pitch * roll).normalize()
    }

    /// Encode as a datagram.
    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        let mut out = [0u8; PACKET_SIZE];
        for (offset, value) in [
            (OFF_X, self.x),
            (OFF_Y, self.y),
            (OFF_Z, self.z),
            (OFF_YAW, self.yaw),
            (OFF_PITCH, self.pitch),
            (OFF_ROLL, self.roll),
        ] {
            if let Some(slot) = out.get_mut(offset..offset + 8) {
                slot.copy_from_slice(&value.to_le_bytes());
            }
        }
        out
    }
}

fn read_f64_le(data: &[u8], offset: usize) -> Option<f64> {
    let bytes: [u8; 8] = data.get(offset..offset + 8)?.try_into().ok()?;
    Some(f64::from_le_bytes(bytes))
}

/// Decode a datagram.
///
/// # Errors
///
/// - [`TelemetryError::InvalidPacketSize`] unless `data` is exactly
///   [`PACKET_SIZE`] bytes
/// - [`TelemetryError::NonFiniteValue`] if any field is NaN or infinite
pub fn parse_packet(data: &[u8]) -> Result<OpenTrackSample, TelemetryError> {
    if data.len() != PACKET_SIZE {
        return Err(TelemetryError::InvalidPacketSize {
            expected: PACKET_SIZE,
            actual: data.len(),
        });
    }

    let field = |name: &'static str, offset: usize| -> Result<f64, TelemetryError> {
        let value = read_f64_le(data, offset).ok_or(TelemetryError::InvalidPacketSize {
            expected: PACKET_SIZE,
            actual: data.len(),
        })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(TelemetryError::NonFiniteValue { field: name })
        }
    };

    Ok(OpenTrackSample {
        x: field("x", OFF_X)?,
        y: field("y", OFF_Y)?,
        z: field("z", OFF_Z)?,
        yaw: field("yaw", OFF_YAW)?,
        pitch: field("pitch", OFF_PITCH)?,
        roll: field("roll", OFF_ROLL)?,
    })
}
