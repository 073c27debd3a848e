//! Fixed-rate tick scheduling for the OpenStereo worker threads.
//!
//! The pose thread runs at the display frequency (capped so device polling
//! stays at or below 125 Hz), the hotkey thread at a looser cadence. Both use
//! [`TickScheduler`]:
//!
//! 1. [`TickScheduler::begin_tick`] measures the wall-clock delta since the
//!    previous tick. Finite-difference derivatives divide by this measured
//!    delta, never by the nominal period.
//! 2. The caller does its work.
//! 3. [`TickScheduler::end_tick`] sleeps `max(0, period - time spent)` and
//!    records whether the tick overran.
//!
//! There is no busy-spin: these loops tolerate a millisecond of jitter.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod error;
pub mod jitter;
pub mod scheduler;
pub mod sleep;

pub use error::{SchedulerError, SchedulerResult};
pub use jitter::JitterMetrics;
pub use scheduler::{TickInfo, TickScheduler, period_for_frequency};
pub use sleep::PlatformSleep;

/// Shortest period a device-polling loop may use (125 Hz).
pub const MIN_POLL_PERIOD_NS: u64 = 8_000_000;

/// Nanoseconds per second.
pub const NANOS_PER_SEC: u64 = 1_000_000_000;
