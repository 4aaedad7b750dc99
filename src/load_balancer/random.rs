//! Uniform random load balancing strategy.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::load_balancer::{bound, Balancer, BalancerError, Group};

/// SplitMix64 increment.
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Random selector over a seeded, lock-free generator.
///
/// Each call claims the next SplitMix64 state with one `fetch_add`, so callers
/// never wait on each other.
pub struct Random {
    group: Arc<dyn Group>,
    seed: u64,
    state: AtomicU64,
}

impl Random {
    /// Same seed and same group sizes give the same sequence of indices.
    pub fn with_seed(group: Arc<dyn Group>, seed: u64) -> Self {
        Self {
            group,
            seed,
            state: AtomicU64::new(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Balancer for Random {
    fn index(&self) -> Result<u64, BalancerError> {
        let size = bound(self.group.as_ref())?;
        let state = self
            .state
            .fetch_add(GOLDEN_GAMMA, Ordering::Relaxed)
            .wrapping_add(GOLDEN_GAMMA);
        Ok(SmallRng::seed_from_u64(mix(state)).gen_range(0..size))
    }
}

/// SplitMix64 output function.
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl fmt::Debug for Random {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Random")
            .field("size", &self.group.size())
            .field("seed", &self.seed)
            .finish()
    }
}
