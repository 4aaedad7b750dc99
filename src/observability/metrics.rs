//! Metrics emitted by the primitives.
//!
//! # Metrics
//! - `resilience_breaker_transitions_total` (counter): transitions by breaker, target state
//! - `resilience_breaker_rejected_total` (counter): calls failed fast by an open breaker
//! - `resilience_tokens_provisioned_total` (counter): tokens added by background refill

use crate::resilience::circuit_breaker::State;

pub const BREAKER_TRANSITIONS: &str = "resilience_breaker_transitions_total";
pub const BREAKER_REJECTED: &str = "resilience_breaker_rejected_total";
pub const TOKENS_PROVISIONED: &str = "resilience_tokens_provisioned_total";

/// Record a breaker entering `to`.
pub fn record_breaker_transition(breaker: &'static str, to: State) {
    ::metrics::counter!(BREAKER_TRANSITIONS, "breaker" => breaker, "state" => to.as_str())
        .increment(1);
}

/// Record a call rejected without running.
pub fn record_breaker_rejected(breaker: &'static str) {
    ::metrics::counter!(BREAKER_REJECTED, "breaker" => breaker).increment(1);
}

/// Record tokens put back by a refill tick. Ticks into a full bucket are not counted.
pub fn record_tokens_provisioned(added: i64) {
    if added > 0 {
        ::metrics::counter!(TOKENS_PROVISIONED).increment(added as u64);
    }
}
