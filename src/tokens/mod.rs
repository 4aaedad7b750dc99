//! Token bucket subsystem.
//!
//! # Data Flow
//! ```text
//! Caller wants n permits
//!     → take(n): all, part, or none of n, in one compare-and-swap
//!     → work proceeds for the permits granted
//!     → put(n) returns permits (manually, or from provision.rs's ticker)
//! ```
//!
//! # Design Decisions
//! - No locks on take/put; contention retries the compare-and-swap
//! - Partial grants instead of all-or-nothing, so callers can batch
//! - The provisioning variant owns its ticker and must be closed (or dropped)
//! - Refill is clamped to at least one token per tick

pub mod bucket;
pub mod provision;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ResilienceError, ResilienceResult};
use crate::time::{TickerFactory, WallTickerFactory};

pub use bucket::Bucket;
pub use provision::ProvisionedBucket;

/// A rate-limited pool of permits.
pub trait Token: Send + Sync {
    /// Take up to `n` tokens, returning how many were taken.
    fn take(&self, n: i64) -> i64;

    /// Return up to `n` tokens, returning how many fit under the capacity.
    fn put(&self, n: i64) -> i64;

    /// Tokens currently available.
    fn available(&self) -> i64;

    fn capacity(&self) -> i64;

    /// Stop any background refill. No-op for buckets without one.
    fn close(&self);
}

/// Token bucket strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Refilled automatically at a derived rate.
    #[default]
    Provision,
    /// Fixed pool, replenished only by `put`.
    Bucket,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Provision => "provision",
            TokenKind::Bucket => "bucket",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = ResilienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "provision" => Ok(TokenKind::Provision),
            "bucket" => Ok(TokenKind::Bucket),
            other => Err(ResilienceError::unknown("token", other)),
        }
    }
}

/// Construction options for token buckets.
#[derive(Clone)]
pub struct TokenOptions {
    tickers: Arc<dyn TickerFactory>,
}

impl TokenOptions {
    /// Use a different ticker source for provisioning buckets.
    pub fn with_tickers(mut self, tickers: impl TickerFactory + 'static) -> Self {
        self.tickers = Arc::new(tickers);
        self
    }
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            tickers: Arc::new(WallTickerFactory),
        }
    }
}

/// Create a token bucket of the given kind.
///
/// `freq` is the provisioning refill frequency; `None` disables refilling and
/// it is ignored for [`TokenKind::Bucket`].
pub fn new(
    kind: TokenKind,
    capacity: i64,
    freq: Option<Duration>,
    options: TokenOptions,
) -> ResilienceResult<Box<dyn Token>> {
    if capacity < 0 {
        return Err(ResilienceError::InvalidCapacity(capacity));
    }

    match kind {
        TokenKind::Provision => Ok(Box::new(ProvisionedBucket::new(
            capacity,
            freq,
            options.tickers.as_ref(),
        )?)),
        TokenKind::Bucket => Ok(Box::new(Bucket::new(capacity))),
    }
}
