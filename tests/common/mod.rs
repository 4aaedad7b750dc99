//! Shared utilities for integration tests.

use std::time::{Duration, Instant};

use resilience_kit::load_balancer::Group;
use resilience_kit::observability::logging;
use resilience_kit::resilience::{self, Breaker, BreakerKind, BreakerOptions};
use resilience_kit::time::stub::{StubTimer, StubTimerFactory};

/// Install a test subscriber once; later calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    logging::init("resilience_kit=debug");
}

/// A group with a fixed member count.
#[allow(dead_code)]
pub struct Fixed(pub i64);

impl Group for Fixed {
    fn size(&self) -> i64 {
        self.0
    }
}

/// A circuit breaker driven by a stub timer.
#[allow(dead_code)]
pub fn stub_breaker(
    failure_threshold: u64,
    expiry: Duration,
    options: BreakerOptions,
) -> (Box<dyn Breaker>, StubTimer) {
    let timers = StubTimerFactory::new();
    let breaker = resilience::new(
        BreakerKind::Circuit,
        failure_threshold,
        expiry,
        options.with_timers(timers.clone()),
    )
    .unwrap();
    let timer = timers.timer().expect("breaker created a timer");
    (breaker, timer)
}

/// Poll `cond` until it holds or `timeout` passes.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}
