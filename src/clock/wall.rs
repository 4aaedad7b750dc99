//! Wall clock stamped from the system time.
//!
//! Values are nanoseconds since the Unix epoch. Used for tie-breaking, not for
//! causal ordering: two processes' wall clocks are only as close as their NTP.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::{lamport, Clock};
use crate::time::{unix_nanos, Time};

/// A clock initialised from, and reset to, the current system time.
#[derive(Debug)]
pub struct WallClock {
    stamp: AtomicU64,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            stamp: AtomicU64::new(unix_nanos()),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for WallClock {
    fn clone(&self) -> Self {
        Self {
            stamp: AtomicU64::new(self.stamp.load(Ordering::Acquire)),
        }
    }
}

impl Clock for WallClock {
    fn now(&self) -> Time {
        Time::new(self.stamp.load(Ordering::Acquire))
    }

    fn increment(&self) -> Time {
        Time::new(self.stamp.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
    }

    fn witness(&self, other: Time) {
        lamport::witness(&self.stamp, other.value());
    }

    fn clone_clock(&self) -> Box<dyn Clock> {
        Box::new(self.clone())
    }

    /// Resynchronise with the system time. This may move the clock backwards.
    fn reset(&self) {
        let mut current = self.stamp.load(Ordering::Acquire);
        loop {
            let now = unix_nanos();
            if now == current {
                return;
            }
            match self
                .stamp
                .compare_exchange_weak(current, now, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_starts_at_system_time() {
        let before = unix_nanos();
        let clock = WallClock::new();
        let after = unix_nanos();

        let now = clock.now().value();
        assert!(now >= before && now <= after);
    }

    #[test]
    fn test_witness_future_stamp() {
        let clock = WallClock::new();
        let future = Time::new(clock.now().value() + 1_000_000);
        clock.witness(future);
        assert!(clock.now().after(future));
    }

    #[test]
    fn test_reset_resyncs() {
        let clock = WallClock::new();
        clock.witness(Time::new(u64::MAX - 10));

        thread::sleep(Duration::from_millis(1));
        clock.reset();

        assert!(clock.now().value() < u64::MAX - 10);
        assert!(clock.now().value() <= unix_nanos());
    }
}
