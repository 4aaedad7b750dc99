//! Construction errors shared by every primitive family.

use thiserror::Error;

/// Errors raised while building a primitive.
///
/// None of these are produced by a constructed object; once a breaker, bucket
/// or balancer exists its operations report their own narrower errors.
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// A strategy name did not match any known kind of the family.
    #[error("invalid {family} type {name:?}")]
    UnknownKind { family: &'static str, name: String },

    /// Capacity is negative, or zero where a refill rate must be derived from it.
    #[error("invalid token capacity {0}")]
    InvalidCapacity(i64),

    /// A threshold or attempt count that must be at least one.
    #[error("invalid {name} {value}, must be at least 1")]
    InvalidThreshold { name: &'static str, value: u64 },

    /// A timer or ticker was asked to fire every zero nanoseconds.
    #[error("timer period must be non-zero")]
    ZeroPeriod,

    /// The background worker thread or its runtime could not be started.
    #[error("failed to start background worker: {0}")]
    Worker(#[from] std::io::Error),
}

/// Result type for constructors.
pub type ResilienceResult<T> = Result<T, ResilienceError>;

impl ResilienceError {
    pub(crate) fn unknown(family: &'static str, name: &str) -> Self {
        Self::UnknownKind {
            family,
            name: name.to_string(),
        }
    }
}
