//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Durations are plain millisecond integers.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::{self, Clock, ClockKind};
use crate::error::ResilienceResult;
use crate::load_balancer::{self, Balancer, BalancerKind, BalancerOptions, Group};
use crate::resilience::{self, Breaker, BreakerKind, BreakerOptions, Retrier, ThreadSleeper};
use crate::tokens::{self, Token, TokenKind, TokenOptions};

/// Root configuration for a set of resilience primitives.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Circuit breaker guarding downstream calls.
    pub breaker: BreakerConfig,

    /// Token bucket pacing throughput.
    pub tokens: TokenConfig,

    /// Target selection strategy.
    pub balancer: BalancerConfig,

    /// Event ordering clock.
    pub clock: ClockConfig,

    /// Retry policy.
    pub retries: RetryConfig,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BreakerConfig {
    pub kind: BreakerKind,

    /// Consecutive failures that open the breaker.
    pub failure_threshold: u64,

    /// Successful half-open calls that close it again.
    pub success_threshold: u64,

    /// Time spent open before allowing a trial call, in milliseconds.
    pub expiry_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            kind: BreakerKind::Circuit,
            failure_threshold: 5,
            success_threshold: 1,
            expiry_ms: 30_000,
        }
    }
}

impl BreakerConfig {
    pub fn expiry(&self) -> Duration {
        Duration::from_millis(self.expiry_ms)
    }

    pub fn build(&self) -> ResilienceResult<Box<dyn Breaker>> {
        resilience::new(
            self.kind,
            self.failure_threshold,
            self.expiry(),
            BreakerOptions::default().with_success_threshold(self.success_threshold),
        )
    }
}

/// Token bucket configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TokenConfig {
    pub kind: TokenKind,

    /// Maximum tokens held.
    pub capacity: i64,

    /// Whether a provisioning bucket refills itself.
    pub refill: bool,

    /// Refill frequency in milliseconds. Anything finer than one token per
    /// tick, 0 included, is raised to `1000 / capacity` ms.
    pub refill_ms: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            kind: TokenKind::Provision,
            capacity: 100,
            refill: true,
            refill_ms: 100,
        }
    }
}

impl TokenConfig {
    pub fn refill(&self) -> Option<Duration> {
        self.refill.then(|| Duration::from_millis(self.refill_ms))
    }

    pub fn build(&self) -> ResilienceResult<Box<dyn Token>> {
        tokens::new(self.kind, self.capacity, self.refill(), TokenOptions::default())
    }
}

/// Balancer configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BalancerConfig {
    pub kind: BalancerKind,

    /// Fixed seed for the random balancer.
    pub seed: Option<u64>,
}

impl BalancerConfig {
    pub fn build(&self, group: Arc<dyn Group>) -> Box<dyn Balancer> {
        let options = match self.seed {
            Some(seed) => BalancerOptions::default().with_seed(seed),
            None => BalancerOptions::default(),
        };
        load_balancer::new(self.kind, group, options)
    }
}

/// Clock configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClockConfig {
    pub kind: ClockKind,
}

impl ClockConfig {
    pub fn build(&self) -> Box<dyn Clock> {
        clock::new(self.kind)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first call.
    pub attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    pub fn build(&self) -> ResilienceResult<Retrier<ThreadSleeper>> {
        Ok(
            Retrier::new(ThreadSleeper, self.attempts, Duration::from_millis(self.base_delay_ms))?
                .with_max_delay(Duration::from_millis(self.max_delay_ms)),
        )
    }
}
