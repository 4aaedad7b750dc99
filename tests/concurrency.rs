//! Concurrent use of the lock-free primitives.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use resilience_kit::clock::{self, ClockKind};
use resilience_kit::gate::{self, GateKind, Side};
use resilience_kit::load_balancer::{self, BalancerError, BalancerKind, BalancerOptions};
use resilience_kit::time::stub::StubTickerFactory;
use resilience_kit::time::Time;
use resilience_kit::tokens::{self, TokenKind, TokenOptions};

mod common;

#[test]
fn test_lamport_causality_across_threads() {
    let clock = clock::new(ClockKind::Lamport);
    let max_witnessed = AtomicU64::new(0);
    let threads = 8u64;
    let increments_per_thread = 500u64;

    std::thread::scope(|s| {
        for t in 0..threads {
            let clock = &clock;
            let max_witnessed = &max_witnessed;
            s.spawn(move || {
                for i in 0..increments_per_thread {
                    clock.increment();
                    if i % 50 == 0 {
                        let remote = (t + 1) * 1_000 + i;
                        max_witnessed.fetch_max(remote, Ordering::SeqCst);
                        clock.witness(Time::new(remote));
                    }
                }
            });
        }
    });

    let final_value = clock.now().value();
    assert!(final_value > max_witnessed.load(Ordering::SeqCst));
    assert!(final_value >= threads * increments_per_thread);
}

#[test]
fn test_bucket_never_over_grants() {
    let bucket = tokens::new(TokenKind::Bucket, 1_000, None, TokenOptions::default()).unwrap();
    let granted = AtomicU64::new(0);

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..100 {
                    granted.fetch_add(bucket.take(3) as u64, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(granted.load(Ordering::SeqCst), 1_000);
    assert_eq!(bucket.available(), 0);
}

#[test]
fn test_take_and_put_stay_in_bounds() {
    let bucket = tokens::new(TokenKind::Bucket, 50, None, TokenOptions::default()).unwrap();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..200 {
                    let taken = bucket.take(7);
                    assert!((0..=7).contains(&taken));
                    let available = bucket.available();
                    assert!((0..=50).contains(&available));
                    bucket.put(taken);
                }
            });
        }
    });

    assert_eq!(bucket.available(), 50);
}

#[test]
fn test_provisioned_refill_clamped_to_capacity() {
    let tickers = StubTickerFactory::new();
    let bucket = tokens::new(
        TokenKind::Provision,
        10,
        Some(Duration::from_millis(500)),
        TokenOptions::default().with_tickers(tickers.clone()),
    )
    .unwrap();
    let ticker = tickers.ticker().unwrap();

    assert_eq!(bucket.take(10), 10);
    ticker.advance();
    assert_eq!(bucket.available(), 5);
    ticker.advance();
    ticker.advance();
    assert_eq!(bucket.available(), 10);

    bucket.close();
    assert!(ticker.is_stopped());
}

#[test]
fn test_round_robin_fair_in_aggregate() {
    let balancer = load_balancer::new(
        BalancerKind::RoundRobin,
        Arc::new(common::Fixed(4)),
        BalancerOptions::default(),
    );
    let hits: Vec<AtomicUsize> = (0..4).map(|_| AtomicUsize::new(0)).collect();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..100 {
                    let index = balancer.index().unwrap() as usize;
                    hits[index].fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    for hit in &hits {
        assert_eq!(hit.load(Ordering::SeqCst), 100);
    }
}

#[test]
fn test_balancers_reject_empty_group() {
    for kind in [BalancerKind::RoundRobin, BalancerKind::Random] {
        let balancer =
            load_balancer::new(kind, Arc::new(common::Fixed(0)), BalancerOptions::default());
        assert_eq!(balancer.index(), Err(BalancerError::EmptyGroup));

        let balancer =
            load_balancer::new(kind, Arc::new(common::Fixed(-1)), BalancerOptions::default());
        assert_eq!(balancer.index(), Err(BalancerError::EmptyGroup));
    }
}

#[test]
fn test_gate_even_switches_return_left() {
    let gate = gate::new(GateKind::Branch, || Ok::<_, ()>(()), || Err(()));

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..250 {
                    gate.switch();
                }
            });
        }
    });

    assert_eq!(gate.side(), Side::Left);
    assert_eq!(gate.run(), Ok(()));
    assert!(!gate.switch());
    assert_eq!(gate.run(), Err(()));
}
