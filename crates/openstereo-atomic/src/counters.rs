//! Relaxed event counters for the driver threads.
//!
//! Every method is a single `fetch_add` with `Ordering::Relaxed`. The values
//! are eventually consistent and never used for synchronization, only for
//! status logging and for tests that assert how often something happened.

use core::sync::atomic::{AtomicU64, Ordering};

/// Counter snapshot returned by [`DriverCounters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Pose ticks completed
    pub pose_ticks: u64,
    /// Pose ticks whose work exceeded the tick period
    pub pose_overruns: u64,
    /// Input/hotkey ticks completed
    pub input_ticks: u64,
    /// Times both eye projections were recomputed and pushed to the host
    pub projection_updates: u64,
    /// Depth values pushed to the host
    pub depth_updates: u64,
    /// Telemetry datagrams accepted
    pub telemetry_packets_received: u64,
    /// Telemetry datagrams discarded as malformed
    pub telemetry_packets_dropped: u64,
    /// Profiles applied
    pub profile_loads: u64,
    /// Profile loads that failed
    pub profile_load_failures: u64,
    /// Host calls skipped because the device was inactive
    pub host_calls_suppressed: u64,
}

/// Event counters shared by all worker threads.
///
/// ```rust
/// use openstereo_atomic::DriverCounters;
///
/// let counters = DriverCounters::new();
/// counters.inc_projection_update();
/// counters.inc_projection_update();
/// assert_eq!(counters.projection_updates(), 2);
/// ```
#[derive(Debug)]
pub struct DriverCounters {
    pose_ticks: AtomicU64,
    pose_overruns: AtomicU64,
    input_ticks: AtomicU64,
    projection_updates: AtomicU64,
    depth_updates: AtomicU64,
    telemetry_packets_received: AtomicU64,
    telemetry_packets_dropped: AtomicU64,
    profile_loads: AtomicU64,
    profile_load_failures: AtomicU64,
    host_calls_suppressed: AtomicU64,
}

impl Default for DriverCounters {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! counter_ops {
    ($($field:ident => $inc:ident, $get:ident;)*) => {
        $(
            #[doc = concat!("Increment `", stringify!($field), "`.")]
            #[inline]
            pub fn $inc(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }

            #[doc = concat!("Current value of `", stringify!($field), "`.")]
            #[inline]
            pub fn $get(&self) -> u64 {
                self.$field.load(Ordering::Relaxed)
            }
        )*
    };
}

impl DriverCounters {
    /// Create a new set of counters, all zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pose_ticks: AtomicU64::new(0),
            pose_overruns: AtomicU64::new(0),
            input_ticks: AtomicU64::new(0),
            projection_updates: AtomicU64::new(0),
            depth_updates: AtomicU64::new(0),
            telemetry_packets_received: AtomicU64::new(0),
            telemetry_packets_dropped: AtomicU64::new(0),
            profile_loads: AtomicU64::new(0),
            profile_load_failures: AtomicU64::new(0),
            host_calls_suppressed: AtomicU64::new(0),
        }
    }

    counter_ops! {
        pose_ticks => inc_pose_tick, pose_ticks;
        pose_overruns => inc_pose_overrun, pose_overruns;
        input_ticks => inc_input_tick, input_ticks;
        projection_updates => inc_projection_update, projection_updates;
        depth_updates => inc_depth_update, depth_updates;
        telemetry_packets_received => inc_telemetry_received, telemetry_packets_received;
        telemetry_packets_dropped => inc_telemetry_dropped, telemetry_packets_dropped;
        profile_loads => inc_profile_load, profile_loads;
        profile_load_failures => inc_profile_load_failure, profile_load_failures;
        host_calls_suppressed => inc_host_call_suppressed, host_calls_suppressed;
    }

    /// Read all counters.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            pose_ticks: self.pose_ticks(),
            pose_overruns: self.pose_overruns(),
            input_ticks: self.input_ticks(),
            projection_updates: self.projection_updates(),
            depth_updates: self.depth_updates(),
            telemetry_packets_received: self.telemetry_packets_received(),
            telemetry_packets_dropped: self.telemetry_packets_dropped(),
            profile_loads: self.profile_loads(),
            profile_load_failures: self.profile_load_failures(),
            host_calls_suppressed: self.host_calls_suppressed(),
        }
    }

    /// Read all counters and reset them to zero.
    pub fn snapshot_and_reset(&self) -> CounterSnapshot {
        CounterSnapshot {
            pose_ticks: self.pose_ticks.swap(0, Ordering::Relaxed),
            pose_overruns: self.pose_overruns.swap(0, Ordering::Relaxed),
            input_ticks: self.input_ticks.swap(0, Ordering::Relaxed),
            projection_updates: self.projection_updates.swap(0, Ordering::Relaxed),
            depth_updates: self.depth_updates.swap(0, Ordering::Relaxed),
            telemetry_packets_received: self.telemetry_packets_received.swap(0, Ordering::Relaxed),
            telemetry_packets_dropped: self.telemetry_packets_dropped.swap(0, Ordering::Relaxed),
            profile_loads: self.profile_loads.swap(0, Ordering::Relaxed),
            profile_load_failures: self.profile_load_failures.swap(0, Ordering::Relaxed),
            host_calls_suppressed: self.host_calls_suppressed.swap(0, Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_increments() {
        let counters = DriverCounters::new();
        counters.inc_pose_tick();
        counters.inc_pose_tick();
        counters.inc_telemetry_dropped();
        let snap = counters.snapshot();
        assert_eq!(snap.pose_ticks, 2);
        assert_eq!(snap.telemetry_packets_dropped, 1);
        assert_eq!(snap.projection_updates, 0);
    }

    #[test]
    fn snapshot_and_reset_zeroes() {
        let counters = DriverCounters::new();
        counters.inc_profile_load();
        let first = counters.snapshot_and_reset();
        assert_eq!(first.profile_loads, 1);
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }
}
