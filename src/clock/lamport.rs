//! Lamport logical clock.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::Clock;
use crate::time::Time;

/// A Lamport clock starting at zero.
#[derive(Debug, Default)]
pub struct LamportClock {
    counter: AtomicU64,
}

impl LamportClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clone for LamportClock {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::Acquire)),
        }
    }
}

impl Clock for LamportClock {
    fn now(&self) -> Time {
        Time::new(self.counter.load(Ordering::Acquire))
    }

    fn increment(&self) -> Time {
        Time::new(self.counter.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
    }

    fn witness(&self, other: Time) {
        witness(&self.counter, other.value());
    }

    fn clone_clock(&self) -> Box<dyn Clock> {
        Box::new(self.clone())
    }

    fn reset(&self) {
        let mut current = self.counter.load(Ordering::Acquire);
        while current != 0 {
            match self
                .counter
                .compare_exchange_weak(current, 0, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Advance `counter` to one past the larger of its value and `other`.
///
/// Shared with the wall clock, which merges remote stamps the same way.
pub(crate) fn witness(counter: &AtomicU64, other: u64) {
    let mut current = counter.load(Ordering::Acquire);
    loop {
        let next = current.max(other).wrapping_add(1);
        match counter.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => return,
            // Lost to a concurrent increment or witness; merge against the newer value.
            Err(actual) => current = actual,
        }
    }
}
