//! Blocking counting permit primitive

use parking_lot::{Condvar, Mutex};

/// A counting permit used for result-ready signaling.
///
/// The count starts at zero. [`acquire`](Self::acquire) blocks the calling
/// thread until the count is positive, then decrements it atomically with
/// respect to other acquire/release calls. [`release`](Self::release)
/// increments the count and wakes at least one blocked acquirer.
///
/// The pool uses one signal per submitted task, with exactly one producer
/// (the executing worker) and one consumer (the handle's owner).
pub struct CountingSignal {
    permits: Mutex<usize>,
    available: Condvar,
}

impl CountingSignal {
    /// Create a signal with zero permits.
    pub fn new() -> Self {
        Self::with_permits(0)
    }

    /// Create a signal with an initial permit count.
    pub fn with_permits(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Block until a permit is available, then consume it.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Add a permit and wake a blocked acquirer.
    pub fn release(&self) {
        let mut permits = self.permits.lock();
        *permits += 1;
        self.available.notify_one();
    }

    /// Current permit count.
    pub fn permits(&self) -> usize {
        *self.permits.lock()
    }
}

impl Default for CountingSignal {
    fn default() -> Self {
        Self::new()
    }
}
