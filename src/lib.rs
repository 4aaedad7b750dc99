//! Resilience primitives for a clustered daemon.
//!
//! Small, composable, thread-safe building blocks used to protect calls to
//! unreliable operations, pace throughput, order events across processes and
//! spread work over peers.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                   RESILIENCE KIT                      │
//!                  │                                                       │
//!   guarded call   │  ┌────────────┐   admit/record   ┌────────────────┐  │
//!   ───────────────┼─▶│ resilience │─────────────────▶│ time::Timer    │  │
//!                  │  │  breaker   │◀─── expiry ──────│ (worker thread)│  │
//!                  │  └────────────┘                  └────────────────┘  │
//!                  │                                                       │
//!   take/put       │  ┌────────────┐      refill      ┌────────────────┐  │
//!   ───────────────┼─▶│   tokens   │◀─────────────────│ time::Ticker   │  │
//!                  │  └────────────┘                  └────────────────┘  │
//!                  │                                                       │
//!                  │  ┌────────────┐ ┌──────────────┐ ┌────────────────┐  │
//!                  │  │   clock    │ │load_balancer │ │      gate      │  │
//!                  │  │lamport/wall│ │ rr / random  │ │ left | right   │  │
//!                  │  └────────────┘ └──────────────┘ └────────────────┘  │
//!                  │                                                       │
//!                  │  ┌─────────────────────────────────────────────────┐ │
//!                  │  │ config (TOML) · observability (tracing/metrics) │ │
//!                  │  └─────────────────────────────────────────────────┘ │
//!                  └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Crate Layout
//! - [`time`]: timestamps plus timer and ticker workers (and test stubs)
//! - [`clock`]: Lamport and wall clocks with causal `witness`
//! - [`tokens`]: lock-free token bucket and its self-refilling variant
//! - [`resilience`]: circuit breaker, backoff and retries
//! - [`load_balancer`]: index selection over caller-owned groups
//! - [`gate`]: two-branch execution toggle
//! - [`config`]: declarative TOML config building all of the above
//! - [`observability`]: log subscriber setup and metric names
//!
//! Every family is created through a `new(kind, ...)` factory returning a
//! trait object, with named options for anything injectable.

pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod load_balancer;
pub mod observability;
pub mod resilience;
pub mod time;
pub mod tokens;

pub use clock::{Clock, ClockKind};
pub use config::ResilienceConfig;
pub use error::{ResilienceError, ResilienceResult};
pub use gate::{Gate, GateKind, Side};
pub use load_balancer::{Balancer, BalancerError, BalancerKind, BalancerOptions, Group};
pub use resilience::{
    Breaker, BreakerError, BreakerExt, BreakerKind, BreakerOpen, BreakerOptions, State,
};
pub use time::Time;
pub use tokens::{Token, TokenKind, TokenOptions};
