//! Retry logic.
//!
//! # Responsibilities
//! - Re-run a fallible operation until it succeeds or attempts run out
//! - Wait between attempts with exponential backoff + jitter
//! - Stop immediately on errors the caller marks as permanent
//!
//! # Design Decisions
//! - Never sleeps after the final attempt
//! - Sleeping goes through [`Sleeper`] so tests do not wait on the real clock
//! - The last error is always handed back to the caller

use std::time::Duration;

use crate::error::{ResilienceError, ResilienceResult};
use crate::resilience::backoff::calculate_backoff;
use crate::time::as_millis;

/// Blocks the current thread between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Why a retried operation gave up.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Every attempt failed; `last` is the final attempt's error.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: E,
    },
    /// The operation returned an error the caller marked as not retryable.
    #[error("not retryable: {0}")]
    Aborted(#[source] E),
}

impl<E> RetryError<E> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// The error that ended the retries.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Aborted(err) => err,
        }
    }
}

/// Runs an operation up to a fixed number of attempts.
#[derive(Debug, Clone)]
pub struct Retrier<S = ThreadSleeper> {
    sleeper: S,
    attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl<S: Sleeper> Retrier<S> {
    /// Create a retrier making at most `attempts` calls, waiting `base_delay`
    /// after the first failure and doubling from there.
    pub fn new(sleeper: S, attempts: u32, base_delay: Duration) -> ResilienceResult<Self> {
        if attempts == 0 {
            return Err(ResilienceError::InvalidThreshold {
                name: "retry attempts",
                value: 0,
            });
        }

        Ok(Self {
            sleeper,
            attempts,
            base_delay,
            max_delay: Duration::MAX,
        })
    }

    /// Cap the delay between attempts (before jitter).
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Retry `f` on every error.
    pub fn run<T, E, F>(&self, f: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.run_if(f, |_| true)
    }

    /// Retry `f` only while `is_retryable` accepts its error.
    pub fn run_if<T, E, F, P>(&self, mut f: F, mut is_retryable: P) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
        P: FnMut(&E) -> bool,
    {
        let mut attempt = 1;
        loop {
            let err = match f() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_retryable(&err) {
                return Err(RetryError::Aborted(err));
            }
            if attempt >= self.attempts {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }

            let delay = calculate_backoff(attempt, self.base_delay, self.max_delay);
            tracing::debug!(
                attempt,
                max_attempts = self.attempts,
                delay_ms = as_millis(delay),
                "Retrying after failure"
            );
            self.sleeper.sleep(delay);
            attempt += 1;
        }
    }
}
