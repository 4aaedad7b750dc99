//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to an unreliable operation:
//!     → circuit_breaker.rs (fail fast while open, count failures, trial when half-open)
//!     → On failure: retries.rs (retry with backoff.rs delays if the error is retryable)
//! ```
//!
//! # Design Decisions
//! - Breakers never swallow, wrap or retry the guarded call's error
//! - A breaker owns exactly one timer; expiry moves it from open to half-open
//! - Retries are opt-in and composable with a breaker, never built into it
//! - Timer sources are injected so tests drive expiry by hand

pub mod backoff;
pub mod circuit_breaker;
pub mod retries;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ResilienceError, ResilienceResult};
use crate::time::{TimerFactory, WallTimerFactory};

pub use circuit_breaker::{BreakerError, BreakerOpen, CircuitBreaker, State};
pub use retries::{Retrier, RetryError, Sleeper, ThreadSleeper};

/// A fail-fast guard around calls to an unreliable operation.
///
/// The two halves of a guarded call are exposed separately so the trait stays
/// object safe; [`BreakerExt::run`] stitches them together.
pub trait Breaker: Send + Sync {
    /// Current state.
    fn state(&self) -> State;

    /// Decide whether a call may run, returning the state it was admitted in.
    fn admit(&self) -> Result<State, BreakerOpen>;

    /// Record the outcome of a call admitted in `admitted`.
    fn record(&self, admitted: State, success: bool);
}

/// Guarded execution for every [`Breaker`], including `dyn Breaker`.
pub trait BreakerExt: Breaker {
    /// Run `f` unless the breaker is open, and feed its outcome back.
    fn run<T, E, F>(&self, f: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let admitted = self.admit()?;
        let result = f();
        self.record(admitted, result.is_ok());
        result.map_err(BreakerError::Inner)
    }
}

impl<B: Breaker + ?Sized> BreakerExt for B {}

/// Breaker strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerKind {
    #[default]
    Circuit,
}

impl BreakerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakerKind::Circuit => "circuit",
        }
    }
}

impl fmt::Display for BreakerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakerKind {
    type Err = ResilienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circuit" => Ok(BreakerKind::Circuit),
            other => Err(ResilienceError::unknown("breaker", other)),
        }
    }
}

/// Construction options for breakers.
#[derive(Clone)]
pub struct BreakerOptions {
    timers: Arc<dyn TimerFactory>,
    success_threshold: u64,
    name: &'static str,
}

impl BreakerOptions {
    /// Use a different timer source.
    pub fn with_timers(mut self, timers: impl TimerFactory + 'static) -> Self {
        self.timers = Arc::new(timers);
        self
    }

    /// Successful half-open calls needed to close again. Defaults to 1.
    pub fn with_success_threshold(mut self, threshold: u64) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Name used in logs and metric labels. Defaults to `"circuit"`.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl Default for BreakerOptions {
    fn default() -> Self {
        Self {
            timers: Arc::new(WallTimerFactory),
            success_threshold: 1,
            name: "circuit",
        }
    }
}

/// Create a breaker of the given kind.
pub fn new(
    kind: BreakerKind,
    failure_threshold: u64,
    expiry: Duration,
    options: BreakerOptions,
) -> ResilienceResult<Box<dyn Breaker>> {
    match kind {
        BreakerKind::Circuit => Ok(Box::new(CircuitBreaker::with_settings(
            options.name,
            failure_threshold,
            options.success_threshold,
            expiry,
            options.timers.as_ref(),
        )?)),
    }
}
