//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic and unknown kinds)
//! - Validate value ranges (thresholds >= 1, capacities >= 0, delays ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: `&ResilienceConfig → Result<(), Vec<ValidationError>>`

use crate::config::schema::ResilienceConfig;
use crate::tokens::TokenKind;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `breaker.expiry_ms`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed config, collecting every problem found.
pub fn validate_config(config: &ResilienceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let breaker = &config.breaker;
    if breaker.failure_threshold == 0 {
        errors.push(ValidationError::new("breaker.failure_threshold", "must be at least 1"));
    }
    if breaker.success_threshold == 0 {
        errors.push(ValidationError::new("breaker.success_threshold", "must be at least 1"));
    }
    if breaker.expiry_ms == 0 {
        errors.push(ValidationError::new("breaker.expiry_ms", "must be greater than 0"));
    }

    let tokens = &config.tokens;
    if tokens.capacity < 0 {
        errors.push(ValidationError::new(
            "tokens.capacity",
            format!("must not be negative, got {}", tokens.capacity),
        ));
    } else if tokens.kind == TokenKind::Provision && tokens.refill && tokens.capacity == 0 {
        errors.push(ValidationError::new(
            "tokens.capacity",
            "must be greater than 0 when refilling",
        ));
    }

    let retries = &config.retries;
    if retries.attempts == 0 {
        errors.push(ValidationError::new("retries.attempts", "must be at least 1"));
    }
    if retries.base_delay_ms > retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            format!("exceeds max_delay_ms ({})", retries.max_delay_ms),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
