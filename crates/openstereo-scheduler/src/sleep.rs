//! Sleep primitive used by the scheduler.

use std::time::{Duration, Instant};

/// Sleeps the current thread with `std::thread::sleep`.
///
/// The loops driven here yield cooperatively; sub-millisecond precision is
/// not needed, so there is no per-OS timer tuning.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformSleep;

impl PlatformSleep {
    /// Create new platform sleep instance.
    pub fn new() -> Self {
        Self
    }

    /// Sleep until `target`, returning immediately if it has passed.
    pub fn sleep_until(&self, target: Instant) {
        let remaining = target.saturating_duration_since(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }

    /// Sleep for `duration`.
    pub fn sleep_for(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
