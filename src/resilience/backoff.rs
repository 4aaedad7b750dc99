//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::time::as_nanos;

/// Delay before retrying after failed attempt number `attempt` (1-based).
///
/// `base * 2^(attempt - 1)`, capped at `max`, plus up to 10% jitter.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    let delay = exponential_delay(attempt, base, max);
    delay.saturating_add(jitter(delay, &mut rand::thread_rng()))
}

/// The capped exponential delay without jitter.
pub fn exponential_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u32.saturating_pow(attempt - 1);
    base.saturating_mul(factor).min(max)
}

fn jitter<R: Rng + ?Sized>(delay: Duration, rng: &mut R) -> Duration {
    let range = as_nanos(delay / 10);
    if range == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(rng.gen_range(0..range))
}
