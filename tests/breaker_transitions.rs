//! Circuit breaker state machine tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use resilience_kit::resilience::{BreakerError, BreakerExt, BreakerOptions, State};

mod common;

#[test]
fn test_trips_after_threshold_and_skips_call() {
    common::init_logging();
    let (breaker, _timer) =
        common::stub_breaker(3, Duration::from_millis(100), BreakerOptions::default());
    let calls = AtomicU32::new(0);

    for _ in 0..3 {
        let err = breaker
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("backend down")
            })
            .unwrap_err();
        assert!(matches!(err, BreakerError::Inner("backend down")));
    }
    assert_eq!(breaker.state(), State::Open);

    let err = breaker
        .run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, &str>(())
        })
        .unwrap_err();
    assert!(err.is_open());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_recovers_through_half_open() {
    let (breaker, timer) =
        common::stub_breaker(3, Duration::from_millis(100), BreakerOptions::default());
    for _ in 0..3 {
        let _ = breaker.run(|| Err::<(), _>("down"));
    }
    assert_eq!(breaker.state(), State::Open);

    timer.advance(Duration::from_millis(110));
    assert_eq!(breaker.state(), State::HalfOpen);

    let value = breaker.run(|| Ok::<_, &str>(42)).unwrap();
    assert_eq!(value, 42);
    assert_eq!(breaker.state(), State::Closed);
}

#[test]
fn test_half_open_failure_reopens() {
    let (breaker, timer) =
        common::stub_breaker(3, Duration::from_millis(100), BreakerOptions::default());
    for _ in 0..3 {
        let _ = breaker.run(|| Err::<(), _>("down"));
    }
    timer.advance(Duration::from_millis(110));
    let resets_before = timer.resets();

    let err = breaker.run(|| Err::<(), _>("still down")).unwrap_err();
    assert_eq!(err.into_inner(), Some("still down"));
    assert_eq!(breaker.state(), State::Open);
    assert_eq!(timer.resets(), resets_before + 1);
    assert!(breaker.run(|| Ok::<_, &str>(())).unwrap_err().is_open());
}

#[test]
fn test_success_threshold_needs_consecutive_trials() {
    let (breaker, timer) = common::stub_breaker(
        1,
        Duration::from_millis(50),
        BreakerOptions::default().with_success_threshold(3),
    );
    let _ = breaker.run(|| Err::<(), _>("down"));
    timer.advance(Duration::from_millis(60));

    for _ in 0..2 {
        breaker.run(|| Ok::<_, &str>(())).unwrap();
        assert_eq!(breaker.state(), State::HalfOpen);
    }
    breaker.run(|| Ok::<_, &str>(())).unwrap();
    assert_eq!(breaker.state(), State::Closed);
}

#[test]
fn test_concurrent_failures_trip_once() {
    let (breaker, timer) =
        common::stub_breaker(10, Duration::from_secs(1), BreakerOptions::default());

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..50 {
                    let _ = breaker.run(|| Err::<(), _>("down"));
                }
            });
        }
    });

    assert_eq!(breaker.state(), State::Open);
    assert_eq!(timer.resets(), 1);
}
