//! Atomic `f32` cell.
//!
//! There is no `AtomicF32` in `core`, so the value is stored as its IEEE-754
//! bit pattern in an [`AtomicU32`]. Equality checks compare bit patterns,
//! which is what the CAS itself does and what "did the value change" means
//! for the convergence short-circuit.

use core::sync::atomic::{AtomicU32, Ordering};

/// An `f32` that can be shared between threads and updated without a lock.
///
/// Loads and stores use `Acquire`/`Release`. Updates retry a
/// `compare_exchange_weak` until they win, so the closure may run more than
/// once under contention and must be pure.
#[derive(Debug)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl AtomicF32 {
    /// Create a new cell.
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    /// Read the current value.
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Overwrite the current value.
    #[inline]
    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    /// Apply `f` in a CAS retry loop. Returns `(old, new)` as committed.
    ///
    /// `f` sees the freshest value on every retry, so a delta applied through
    /// it is never lost to a concurrent writer.
    pub fn update<F>(&self, mut f: F) -> (f32, f32)
    where
        F: FnMut(f32) -> f32,
    {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let new = f(f32::from_bits(current)).to_bits();
            match self.bits.compare_exchange_weak(
                current,
                new,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return (f32::from_bits(current), f32::from_bits(new)),
                Err(actual) => current = actual,
            }
        }
    }

    /// Like [`update`](Self::update), but leaves the cell untouched when `f`
    /// returns a value bit-identical to the current one.
    ///
    /// Returns `None` for the no-op case, `Some((old, new))` otherwise.
    pub fn update_if_changed<F>(&self, mut f: F) -> Option<(f32, f32)>
    where
        F: FnMut(f32) -> f32,
    {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let new = f(f32::from_bits(current)).to_bits();
            if new == current {
                return None;
            }
            match self.bits.compare_exchange_weak(
                current,
                new,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some((f32::from_bits(current), f32::from_bits(new))),
                Err(actual) => current = actual,
            }
        }
    }

    /// Whether the stored value has exactly the bit pattern of `value`.
    #[inline]
    pub fn bits_eq(&self, value: f32) -> bool {
        self.bits.load(Ordering::Acquire) == value.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_returns_initial_value() {
        let cell = AtomicF32::new(4.0);
        assert!(cell.bits_eq(4.0));
    }

    #[test]
    fn update_reports_old_and_new() {
        let cell = AtomicF32::new(1.0);
        let (old, new) = cell.update(|v| v + 0.5);
        assert_eq!(old.to_bits(), 1.0_f32.to_bits());
        assert_eq!(new.to_bits(), 1.5_f32.to_bits());
        assert!(cell.bits_eq(1.5));
    }

    #[test]
    fn update_if_changed_skips_identical_value() {
        let cell = AtomicF32::new(2.0);
        assert!(cell.update_if_changed(|_| 2.0).is_none());
        assert!(cell.update_if_changed(|_| 3.0).is_some());
        assert!(cell.bits_eq(3.0));
    }

    #[test]
    fn negative_zero_is_a_change() {
        let cell = AtomicF32::new(0.0);
        assert!(cell.update_if_changed(|_| -0.0).is_some());
    }
}
