//! Property-based tests for openstereo-atomic using quickcheck.

use openstereo_atomic::{AtomicF32, DriverCounters};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

#[quickcheck]
fn prop_store_load_preserves_bits(value: f32) -> bool {
    let cell = AtomicF32::new(0.0);
    cell.store(value);
    cell.load().to_bits() == value.to_bits()
}

#[quickcheck]
fn prop_floor_clamp_holds(start: f32, delta: f32) -> TestResult {
    if !start.is_finite() || !delta.is_finite() {
        return TestResult::discard();
    }
    let cell = AtomicF32::new(start);
    let (_, new) = cell.update(|v| (v + delta).max(0.1));
    TestResult::from_bool(new >= 0.1)
}

#[quickcheck]
fn prop_unchanged_value_is_noop(value: f32) -> TestResult {
    if value.is_nan() {
        return TestResult::discard();
    }
    let cell = AtomicF32::new(value);
    TestResult::from_bool(cell.update_if_changed(|v| v).is_none())
}

#[quickcheck]
fn prop_counter_increment_is_monotonic(incs: u8) -> bool {
    let counters = DriverCounters::new();
    for _ in 0..incs {
        counters.inc_projection_update();
    }
    counters.projection_updates() == u64::from(incs)
}
