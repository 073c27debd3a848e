//! Cross-thread attitude cell.

use glam::Quat;
use parking_lot::RwLock;

/// Latest external orientation.
///
/// The receiver takes the write lock for each sample; the pose thread takes a
/// read lock once per tick and copies the value out.
#[derive(Debug)]
pub struct SharedAttitude {
    inner: RwLock<Quat>,
}

impl Default for SharedAttitude {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedAttitude {
    /// Start at identity.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Quat::IDENTITY),
        }
    }

    /// Copy of the current attitude.
    pub fn get(&self) -> Quat {
        *self.inner.read()
    }

    /// Publish a new attitude.
    pub fn set(&self, attitude: Quat) {
        *self.inner.write() = attitude;
    }

    /// Back to identity, used when the feed is (re)started.
    pub fn reset(&self) {
        self.set(Quat::IDENTITY);
    }
}
