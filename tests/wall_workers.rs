//! Timer and ticker workers on the real clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use resilience_kit::resilience::{self, BreakerExt, BreakerKind, BreakerOptions, State};
use resilience_kit::time::{
    Ticker, TickerFactory, Timer, TimerFactory, WallTickerFactory, WallTimerFactory,
};
use resilience_kit::tokens::{self, TokenKind, TokenOptions};

mod common;

#[test]
fn test_no_put_after_close() {
    common::init_logging();
    let bucket = tokens::new(
        TokenKind::Provision,
        100,
        Some(Duration::from_millis(10)),
        TokenOptions::default(),
    )
    .unwrap();

    assert_eq!(bucket.take(100), 100);
    assert!(common::wait_until(Duration::from_secs(2), || bucket.available() > 0));

    bucket.close();
    bucket.take(100);
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(bucket.available(), 0);

    bucket.close();
}

#[test]
fn test_no_tick_after_stop() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();
    let ticker = WallTickerFactory
        .start(
            Duration::from_millis(5),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

    assert!(common::wait_until(Duration::from_secs(2), || ticks.load(Ordering::SeqCst) >= 3));
    ticker.stop();
    let seen = ticks.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(ticks.load(Ordering::SeqCst), seen);
}

#[test]
fn test_timer_fires_once_per_reset() {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let timer = WallTimerFactory
        .start(
            Duration::from_millis(10),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

    assert!(common::wait_until(Duration::from_secs(2), || fired.load(Ordering::SeqCst) == 1));
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    timer.reset();
    assert!(common::wait_until(Duration::from_secs(2), || fired.load(Ordering::SeqCst) == 2));

    timer.stop();
    timer.reset();
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[test]
fn test_breaker_half_opens_on_real_timer() {
    let breaker = resilience::new(
        BreakerKind::Circuit,
        1,
        Duration::from_millis(20),
        BreakerOptions::default().with_name("wall"),
    )
    .unwrap();

    let _ = breaker.run(|| Err::<(), _>("down"));
    assert_eq!(breaker.state(), State::Open);

    assert!(common::wait_until(Duration::from_secs(2), || breaker.state() == State::HalfOpen));
    breaker.run(|| Ok::<_, &str>(())).unwrap();
    assert_eq!(breaker.state(), State::Closed);
}
