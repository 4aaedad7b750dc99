//! Circuit breaker for guarded calls.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: the guarded operation is assumed down, calls fail fast
//! - Half-Open: trial calls decide whether it recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold within the expiry window
//! Open → Half-Open: timer expiry
//! Half-Open → Closed: success_count >= success_threshold
//! Half-Open → Open: any trial call fails
//! ```
//!
//! # Design Decisions
//! - One atomic word holds the state; transitions are compare-and-swaps from
//!   the state the caller observed, so a transition that lost a race is dropped
//! - Counters are reset on every transition
//! - One timer per breaker, reused across states
//! - The guarded call's error is always handed back unchanged

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::error::{ResilienceError, ResilienceResult};
use crate::observability::metrics;
use crate::resilience::Breaker;
use crate::time::{Timer, TimerFactory};

/// Breaker state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl From<u8> for State {
    fn from(val: u8) -> Self {
        match val {
            1 => State::Open,
            2 => State::HalfOpen,
            _ => State::Closed,
        }
    }
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Closed => "closed",
            State::Open => "open",
            State::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The breaker is open and the call was not made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
#[error("breaker is open")]
pub struct BreakerOpen;

/// Outcome of a failed guarded call.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// Rejected without running the call.
    #[error(transparent)]
    Open(#[from] BreakerOpen),
    /// The call ran and returned this error.
    #[error(transparent)]
    Inner(E),
}

impl<E> BreakerError<E> {
    /// Whether the call was skipped because the breaker is open.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open(_))
    }

    /// The guarded call's own error, if it ran.
    pub fn into_inner(self) -> Option<E> {
        match self {
            BreakerError::Open(_) => None,
            BreakerError::Inner(err) => Some(err),
        }
    }
}

#[derive(Debug, Default)]
struct Gauge {
    counter: AtomicU64,
}

impl Gauge {
    fn current(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    fn increment(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::AcqRel) + 1
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

/// State shared with the timer callback.
#[derive(Debug)]
struct Shared {
    name: &'static str,
    state: AtomicU8,
    success: Gauge,
    failed: Gauge,
}

impl Shared {
    fn state(&self) -> State {
        State::from(self.state.load(Ordering::Acquire))
    }

    fn reset_counters(&self) {
        self.success.reset();
        self.failed.reset();
    }

    /// Move from `from` to `to` if nobody else moved first.
    fn transition(&self, from: State, to: State) -> bool {
        if self
            .state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        self.reset_counters();
        if from != to {
            tracing::debug!(
                breaker = self.name,
                from = from.as_str(),
                to = to.as_str(),
                "Circuit breaker transition"
            );
            metrics::record_breaker_transition(self.name, to);
        }
        true
    }

    /// Timer expiry: any non-closed state becomes half-open.
    fn expire(&self) {
        loop {
            let current = self.state();
            if current == State::Closed || self.transition(current, State::HalfOpen) {
                return;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Thresholds {
    success: u64,
    failed: u64,
}

impl Thresholds {
    fn reached_success(&self, count: u64) -> bool {
        count >= self.success
    }

    fn reached_failed(&self, count: u64) -> bool {
        count >= self.failed
    }
}

/// A three-state circuit breaker driven by a [`Timer`].
pub struct CircuitBreaker {
    shared: Arc<Shared>,
    thresholds: Thresholds,
    timer: Box<dyn Timer>,
}

impl CircuitBreaker {
    /// Create a closed breaker that opens after `failure_threshold` failures and
    /// closes again after one successful trial call.
    pub fn new(
        failure_threshold: u64,
        expiry: Duration,
        timers: &dyn TimerFactory,
    ) -> ResilienceResult<Self> {
        Self::with_settings("circuit", failure_threshold, 1, expiry, timers)
    }

    pub(crate) fn with_settings(
        name: &'static str,
        failure_threshold: u64,
        success_threshold: u64,
        expiry: Duration,
        timers: &dyn TimerFactory,
    ) -> ResilienceResult<Self> {
        if failure_threshold == 0 {
            return Err(ResilienceError::InvalidThreshold {
                name: "failure threshold",
                value: failure_threshold,
            });
        }
        if success_threshold == 0 {
            return Err(ResilienceError::InvalidThreshold {
                name: "success threshold",
                value: success_threshold,
            });
        }

        let shared = Arc::new(Shared {
            name,
            state: AtomicU8::new(State::Closed as u8),
            success: Gauge::default(),
            failed: Gauge::default(),
        });

        let on_expiry = Arc::clone(&shared);
        let timer = timers.start(expiry, Box::new(move || on_expiry.expire()))?;

        Ok(Self {
            shared,
            thresholds: Thresholds {
                success: success_threshold,
                failed: failure_threshold,
            },
            timer,
        })
    }

    fn trip(&self, from: State) {
        if self.shared.transition(from, State::Open) {
            self.timer.reset();
        }
    }
}

impl Breaker for CircuitBreaker {
    fn state(&self) -> State {
        self.shared.state()
    }

    fn admit(&self) -> Result<State, BreakerOpen> {
        match self.shared.state() {
            State::Open => {
                metrics::record_breaker_rejected(self.shared.name);
                Err(BreakerOpen)
            }
            state => Ok(state),
        }
    }

    fn record(&self, admitted: State, success: bool) {
        // Failures older than one expiry no longer count towards the threshold.
        if self.shared.failed.current() > 0 && self.timer.after() {
            self.shared.reset_counters();
        }

        match admitted {
            State::Closed => {
                if success {
                    return;
                }
                let failed = self.shared.failed.increment();
                if self.thresholds.reached_failed(failed) {
                    self.trip(State::Closed);
                } else {
                    self.timer.now();
                }
            }
            State::HalfOpen => {
                if !success {
                    self.trip(State::HalfOpen);
                    return;
                }
                let succeeded = self.shared.success.increment();
                if self.thresholds.reached_success(succeeded) {
                    self.shared.transition(State::HalfOpen, State::Closed);
                }
            }
            State::Open => {}
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.shared.name)
            .field("state", &self.shared.state())
            .field("success", &self.shared.success.current())
            .field("failed", &self.shared.failed.current())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}
