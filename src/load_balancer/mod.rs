//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Caller owns a group of equally-addressable targets
//!     → Balancer::index() asks the group for its current size
//!     → Apply selection strategy:
//!         - round_robin.rs (rotate through indices)
//!         - random.rs (uniform pick from a seeded generator)
//!     → Caller resolves the index against its own group
//! ```
//!
//! # Design Decisions
//! - Balancers only hand out indices; the group stays owned by the caller
//! - Size is read on every call, so groups may grow or shrink between picks
//! - An empty group is an error, never a panic or a default index

pub mod random;
pub mod round_robin;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ResilienceError;
use crate::time::unix_nanos;

pub use random::Random;
pub use round_robin::RoundRobin;

/// Balancer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BalancerError {
    #[error("empty group")]
    EmptyGroup,
}

/// Anything with a member count.
pub trait Group: Send + Sync {
    fn size(&self) -> i64;
}

impl<T: Send + Sync> Group for [T] {
    fn size(&self) -> i64 {
        i64::try_from(self.len()).unwrap_or(i64::MAX)
    }
}

impl<T: Send + Sync> Group for Vec<T> {
    fn size(&self) -> i64 {
        self.as_slice().size()
    }
}

/// Picks one member of a group by index.
pub trait Balancer: Send + Sync {
    /// Index of the next member to use, in `[0, size)`.
    fn index(&self) -> Result<u64, BalancerError>;
}

/// Group size as an index bound, or `EmptyGroup`.
pub(crate) fn bound(group: &dyn Group) -> Result<u64, BalancerError> {
    match group.size() {
        size if size > 0 => Ok(size as u64),
        _ => Err(BalancerError::EmptyGroup),
    }
}

/// Balancing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancerKind {
    #[default]
    RoundRobin,
    Random,
}

impl BalancerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BalancerKind::RoundRobin => "round_robin",
            BalancerKind::Random => "random",
        }
    }
}

impl fmt::Display for BalancerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BalancerKind {
    type Err = ResilienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(BalancerKind::RoundRobin),
            "random" => Ok(BalancerKind::Random),
            other => Err(ResilienceError::unknown("balancer", other)),
        }
    }
}

/// Construction options for balancers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancerOptions {
    seed: Option<u64>,
}

impl BalancerOptions {
    /// Fix the seed of the random balancer. Defaults to the current wall time.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Create a balancer of the given kind over `group`.
pub fn new(
    kind: BalancerKind,
    group: Arc<dyn Group>,
    options: BalancerOptions,
) -> Box<dyn Balancer> {
    match kind {
        BalancerKind::RoundRobin => Box::new(RoundRobin::new(group)),
        BalancerKind::Random => {
            Box::new(Random::with_seed(group, options.seed.unwrap_or_else(unix_nanos)))
        }
    }
}
