//! Auto-provisioning token bucket.
//!
//! Wraps a [`Bucket`] and a ticker that puts tokens back at a rate derived from
//! the capacity and requested frequency.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ResilienceError, ResilienceResult};
use crate::observability::metrics;
use crate::time::{as_micros, Ticker, TickerFactory};
use crate::tokens::{Bucket, Token};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A bucket refilled by a background ticker.
pub struct ProvisionedBucket {
    bucket: Arc<Bucket>,
    ticker: Option<Box<dyn Ticker>>,
}

impl ProvisionedBucket {
    /// Create a full bucket refilled every `freq`.
    ///
    /// A `freq` shorter than one token's worth of time (`1s / capacity`) is
    /// raised to it. `None` disables refilling: the bucket is then only
    /// replenished by explicit `put` calls.
    pub fn new(
        capacity: i64,
        freq: Option<Duration>,
        tickers: &dyn TickerFactory,
    ) -> ResilienceResult<Self> {
        if capacity < 0 {
            return Err(ResilienceError::InvalidCapacity(capacity));
        }
        let bucket = Arc::new(Bucket::new(capacity));

        let Some(freq) = freq else {
            return Ok(Self {
                bucket,
                ticker: None,
            });
        };
        if capacity == 0 {
            return Err(ResilienceError::InvalidCapacity(capacity));
        }

        let period = refill_period(capacity, freq);
        let increment = refill_increment(capacity, period);

        let refill = Arc::clone(&bucket);
        let ticker = tickers.start(
            period,
            Box::new(move || {
                let added = refill.put(increment);
                metrics::record_tokens_provisioned(added);
            }),
        )?;

        tracing::debug!(
            capacity,
            period_us = as_micros(period),
            increment,
            "Provisioning token bucket started"
        );

        Ok(Self {
            bucket,
            ticker: Some(ticker),
        })
    }

    /// Whether a background refill is running.
    pub fn is_provisioning(&self) -> bool {
        self.ticker.is_some()
    }
}

/// The requested frequency, raised to at least one token per tick.
fn refill_period(capacity: i64, freq: Duration) -> Duration {
    let even = Duration::from_nanos(NANOS_PER_SEC / capacity.max(1) as u64);
    freq.max(even)
}

/// Tokens added per tick: `capacity * period`, rounded half up.
fn refill_increment(capacity: i64, period: Duration) -> i64 {
    (0.5 + capacity as f64 * period.as_secs_f64()).floor() as i64
}

impl Token for ProvisionedBucket {
    fn take(&self, n: i64) -> i64 {
        self.bucket.take(n)
    }

    fn put(&self, n: i64) -> i64 {
        self.bucket.put(n)
    }

    fn available(&self) -> i64 {
        self.bucket.available()
    }

    fn capacity(&self) -> i64 {
        self.bucket.capacity()
    }

    /// Stop refilling. Blocks until the refill worker has exited.
    fn close(&self) {
        if let Some(ticker) = &self.ticker {
            ticker.stop();
        }
    }
}
