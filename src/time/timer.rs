//! Expiry timers.
//!
//! A timer does two separate jobs for its owner:
//! - It fires its callback once per arming, one expiry after construction or `reset`.
//! - It answers `after()`, whether an expiry has elapsed since the last `now()`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::ResilienceResult;
use crate::time::worker::{Schedule, Worker};
use crate::time::{as_nanos, unix_nanos, Callback, Time};

/// A schedulable expiry with an observation window.
pub trait Timer: Send + Sync {
    /// Mark the start of a new `after()` window and return the current time.
    fn now(&self) -> Time;

    /// Whether the expiry has elapsed since the last `now()` (or construction).
    fn after(&self) -> bool;

    /// Re-arm the callback to fire one expiry from now.
    fn reset(&self);

    /// Stop the timer. No callback runs after this returns.
    fn stop(&self);
}

/// Creates timers for components that own one.
pub trait TimerFactory: Send + Sync {
    fn start(&self, expiry: Duration, callback: Callback) -> ResilienceResult<Box<dyn Timer>>;
}

/// Timer backed by the system clock and a background worker.
pub struct WallTimer {
    origin: Instant,
    expiry: Duration,
    /// Nanoseconds after `origin` of the last `now()`.
    mark: AtomicU64,
    worker: Worker,
}

impl WallTimer {
    /// Start a timer whose callback first fires `expiry` from now.
    pub fn new(expiry: Duration, callback: Callback) -> ResilienceResult<Self> {
        let worker = Worker::spawn("timer", Schedule::Once(expiry), callback)?;
        Ok(Self {
            origin: Instant::now(),
            expiry,
            mark: AtomicU64::new(0),
            worker,
        })
    }

    fn elapsed(&self) -> u64 {
        as_nanos(self.origin.elapsed())
    }
}

impl Timer for WallTimer {
    fn now(&self) -> Time {
        self.mark.store(self.elapsed(), Ordering::Release);
        Time::new(unix_nanos())
    }

    fn after(&self) -> bool {
        let since = self
            .elapsed()
            .saturating_sub(self.mark.load(Ordering::Acquire));
        since > as_nanos(self.expiry)
    }

    fn reset(&self) {
        self.worker.rearm();
    }

    fn stop(&self) {
        self.worker.stop();
    }
}

/// Produces [`WallTimer`]s. The default for every component that owns a timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallTimerFactory;

impl TimerFactory for WallTimerFactory {
    fn start(&self, expiry: Duration, callback: Callback) -> ResilienceResult<Box<dyn Timer>> {
        Ok(Box::new(WallTimer::new(expiry, callback)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_after_window() {
        let timer = WallTimer::new(Duration::from_millis(20), Box::new(|| {})).unwrap();
        assert!(!timer.after());

        thread::sleep(Duration::from_millis(40));
        assert!(timer.after());

        timer.now();
        assert!(!timer.after());
        timer.stop();
    }

    #[test]
    fn test_no_callback_after_stop() {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        let timer = WallTimer::new(
            Duration::from_millis(30),
            Box::new(move || {
                f.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        timer.stop();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
