//! # openstereo-atomic
//!
//! Lock-free primitives shared between the OpenStereo worker threads.
//!
//! - [`float`] - [`AtomicF32`], an `f32` stored as bits in an `AtomicU32` and
//!   updated with compare-and-swap retry loops. Depth and convergence live in
//!   these so the input thread can adjust them while the pose and display
//!   paths read them without taking the configuration lock.
//! - [`counters`] - [`DriverCounters`], relaxed event counters read by the
//!   service for periodic status logging and by tests to check that calls happened.
//!
//! ```rust
//! use openstereo_atomic::{AtomicF32, DriverCounters};
//!
//! let depth = AtomicF32::new(0.4);
//! let (_, new) = depth.update(|d| (d - 1000.0).max(0.0));
//! assert_eq!(new.to_bits(), 0.0_f32.to_bits());
//!
//! let counters = DriverCounters::new();
//! counters.inc_pose_tick();
//! assert_eq!(counters.snapshot().pose_ticks, 1);
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod counters;
pub mod float;

pub use counters::{CounterSnapshot, DriverCounters};
pub use float::AtomicF32;
