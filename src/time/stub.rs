//! Manually driven timers and tickers for deterministic tests.
//!
//! The factories keep a handle to the last double they created so a test can
//! build a breaker or bucket through the normal constructor and then drive its
//! time source:
//!
//! ```
//! use std::time::Duration;
//! use resilience_kit::time::stub::StubTickerFactory;
//! use resilience_kit::tokens::{self, TokenKind, TokenOptions};
//!
//! let tickers = StubTickerFactory::new();
//! let bucket = tokens::new(
//!     TokenKind::Provision,
//!     2,
//!     Some(Duration::from_millis(1)),
//!     TokenOptions::default().with_tickers(tickers.clone()),
//! )
//! .unwrap();
//!
//! assert_eq!(bucket.take(2), 2);
//! tickers.ticker().unwrap().advance();
//! assert_eq!(bucket.take(1), 1);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::ResilienceResult;
use crate::time::ticker::{Ticker, TickerFactory};
use crate::time::timer::{Timer, TimerFactory};
use crate::time::{as_nanos, Callback, Time};

struct TimerState {
    expiry: Duration,
    /// Virtual nanoseconds since construction.
    elapsed: AtomicU64,
    mark: AtomicU64,
    resets: AtomicUsize,
    stopped: AtomicBool,
    callback: Callback,
}

/// A timer whose clock only moves when [`StubTimer::advance`] is called.
#[derive(Clone)]
pub struct StubTimer {
    state: Arc<TimerState>,
}

impl StubTimer {
    pub fn new(expiry: Duration, callback: Callback) -> Self {
        Self {
            state: Arc::new(TimerState {
                expiry,
                elapsed: AtomicU64::new(0),
                mark: AtomicU64::new(0),
                resets: AtomicUsize::new(0),
                stopped: AtomicBool::new(false),
                callback,
            }),
        }
    }

    /// Move virtual time forward and fire the callback synchronously.
    pub fn advance(&self, by: Duration) {
        self.state.elapsed.fetch_add(as_nanos(by), Ordering::AcqRel);
        if !self.state.stopped.load(Ordering::Acquire) {
            (self.state.callback)();
        }
    }

    /// The expiry this timer was created with.
    pub fn expiry(&self) -> Duration {
        self.state.expiry
    }

    /// How many times the owner re-armed the timer.
    pub fn resets(&self) -> usize {
        self.state.resets.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::Acquire)
    }
}

impl Timer for StubTimer {
    fn now(&self) -> Time {
        let elapsed = self.state.elapsed.load(Ordering::Acquire);
        self.state.mark.store(elapsed, Ordering::Release);
        Time::new(elapsed)
    }

    fn after(&self) -> bool {
        let since = self
            .state
            .elapsed
            .load(Ordering::Acquire)
            .saturating_sub(self.state.mark.load(Ordering::Acquire));
        since > as_nanos(self.state.expiry)
    }

    fn reset(&self) {
        self.state.resets.fetch_add(1, Ordering::AcqRel);
    }

    fn stop(&self) {
        self.state.stopped.store(true, Ordering::Release);
    }
}

/// Hands out [`StubTimer`]s and remembers the last one.
#[derive(Clone, Default)]
pub struct StubTimerFactory {
    created: Arc<Mutex<Option<StubTimer>>>,
}

impl StubTimerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently created timer, if any.
    pub fn timer(&self) -> Option<StubTimer> {
        self.created.lock().clone()
    }
}

impl TimerFactory for StubTimerFactory {
    fn start(&self, expiry: Duration, callback: Callback) -> ResilienceResult<Box<dyn Timer>> {
        let timer = StubTimer::new(expiry, callback);
        *self.created.lock() = Some(timer.clone());
        Ok(Box::new(timer))
    }
}

struct TickerState {
    period: Duration,
    ticks: AtomicUsize,
    stopped: AtomicBool,
    callback: Callback,
}

/// A ticker that only ticks when [`StubTicker::advance`] is called.
#[derive(Clone)]
pub struct StubTicker {
    state: Arc<TickerState>,
}

impl StubTicker {
    pub fn new(period: Duration, callback: Callback) -> Self {
        Self {
            state: Arc::new(TickerState {
                period,
                ticks: AtomicUsize::new(0),
                stopped: AtomicBool::new(false),
                callback,
            }),
        }
    }

    /// Deliver one tick synchronously, unless the ticker was stopped.
    pub fn advance(&self) {
        if self.state.stopped.load(Ordering::Acquire) {
            return;
        }
        (self.state.callback)();
        self.state.ticks.fetch_add(1, Ordering::AcqRel);
    }

    /// The period the owner asked for, after any clamping it applied.
    pub fn period(&self) -> Duration {
        self.state.period
    }

    /// Ticks delivered so far.
    pub fn ticks(&self) -> usize {
        self.state.ticks.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::Acquire)
    }
}

impl Ticker for StubTicker {
    fn stop(&self) {
        self.state.stopped.store(true, Ordering::Release);
    }
}

/// Hands out [`StubTicker`]s and remembers the last one.
#[derive(Clone, Default)]
pub struct StubTickerFactory {
    created: Arc<Mutex<Option<StubTicker>>>,
}

impl StubTickerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently created ticker, if any.
    pub fn ticker(&self) -> Option<StubTicker> {
        self.created.lock().clone()
    }
}

impl TickerFactory for StubTickerFactory {
    fn start(&self, period: Duration, callback: Callback) -> ResilienceResult<Box<dyn Ticker>> {
        let ticker = StubTicker::new(period, callback);
        *self.created.lock() = Some(ticker.clone());
        Ok(Box::new(ticker))
    }
}
