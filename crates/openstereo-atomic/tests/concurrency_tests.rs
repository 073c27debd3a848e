//! Concurrency tests for openstereo-atomic.
//!
//! Several threads hammer the same float cell and counters; no update may be
//! lost and no clamp may be bypassed.

use std::sync::Arc;
use std::thread;

use openstereo_atomic::{AtomicF32, DriverCounters};

#[test]
fn test_concurrent_deltas_are_not_lost() {
    // Integers below 2^24 are exact in f32, so the final sum is exact too.
    let cell = Arc::new(AtomicF32::new(0.0));
    let num_threads = 8;
    let increments_per_thread = 2_000;

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for _ in 0..increments_per_thread {
                    cell.update(|v| v + 1.0);
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok(), "thread panicked unexpectedly");
    }

    assert!(cell.bits_eq(16_000.0));
}

#[test]
fn test_concurrent_clamp_never_goes_negative() {
    let cell = Arc::new(AtomicF32::new(0.5));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for _ in 0..5_000 {
                    let delta = if i % 2 == 0 { -0.25 } else { 0.125 };
                    let (_, new) = cell.update(|v| (v + delta).max(0.0));
                    assert!(new >= 0.0);
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok(), "thread panicked unexpectedly");
    }
    assert!(cell.load() >= 0.0);
}

#[test]
fn test_concurrent_counters() {
    let counters = Arc::new(DriverCounters::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let counters = Arc::clone(&counters);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    counters.inc_pose_tick();
                    counters.inc_telemetry_received();
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok(), "thread panicked unexpectedly");
    }

    let snap = counters.snapshot();
    assert_eq!(snap.pose_ticks, 4_000);
    assert_eq!(snap.telemetry_packets_received, 4_000);
}
