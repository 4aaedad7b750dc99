//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Primitives produce:
//!     → tracing events at debug level (worker lifecycle, breaker transitions)
//!     → metrics.rs counters through the `metrics` facade
//!
//! Consumers (owned by the embedding daemon):
//!     → logging.rs installs a subscriber when the daemon wants one
//!     → a metrics recorder/exporter installed by the daemon
//! ```
//!
//! # Design Decisions
//! - Nothing logs on the guarded call path above debug level
//! - No recorder is installed here; without one, metric updates are no-ops
//! - Metric names are constants so dashboards and tests agree

pub mod logging;
pub mod metrics;
