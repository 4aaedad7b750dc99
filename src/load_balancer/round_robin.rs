//! Round-robin load balancing strategy.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::load_balancer::{bound, Balancer, BalancerError, Group};

/// Round-robin selector.
/// Stores an internal counter to rotate through the group.
pub struct RoundRobin {
    group: Arc<dyn Group>,
    counter: AtomicU64,
}

impl RoundRobin {
    pub fn new(group: Arc<dyn Group>) -> Self {
        Self {
            group,
            counter: AtomicU64::new(0),
        }
    }
}

impl Balancer for RoundRobin {
    fn index(&self) -> Result<u64, BalancerError> {
        let size = bound(self.group.as_ref())?;
        let cursor = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(cursor % size)
    }
}

impl fmt::Debug for RoundRobin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundRobin")
            .field("size", &self.group.size())
            .field("counter", &self.counter.load(Ordering::Relaxed))
            .finish()
    }
}
