//! External head-orientation feed.
//!
//! Head trackers such as opentrack can forward their output as a bare UDP
//! datagram of six little-endian `f64` values. The receiver turns each valid
//! datagram into a quaternion and publishes it through [`SharedAttitude`],
//! which the pose thread reads every tick.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod attitude;
pub mod packet;
pub mod receiver;

pub use attitude::SharedAttitude;
pub use packet::{OpenTrackSample, PACKET_SIZE, parse_packet};
pub use receiver::{ReceiverConfig, TelemetryReceiver};

/// Default UDP port of the orientation feed.
pub const DEFAULT_PORT: u16 = 4242;
