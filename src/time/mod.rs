//! Timing subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker / provisioning bucket construction
//!     → TimerFactory / TickerFactory (injected via options)
//!         - WallTimerFactory / WallTickerFactory: worker.rs thread driven by tokio time
//!         - StubTimerFactory / StubTickerFactory: manual advance() for tests
//!     → callback fires on expiry / every period
//!     → stop() joins the worker; no callback fires afterwards
//! ```
//!
//! # Design Decisions
//! - Nothing above this module reads the system clock for scheduling
//! - One dedicated worker thread per timer or ticker, never a shared pool
//! - Stopping is a request plus a join, not a fire-and-forget cancellation
//! - Workers are also stopped on drop

pub mod stub;
pub mod ticker;
pub mod timer;
mod worker;

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub use ticker::{Ticker, TickerFactory, WallTicker, WallTickerFactory};
pub use timer::{Timer, TimerFactory, WallTimer, WallTimerFactory};

/// Callback run by a timer on expiry or by a ticker on every tick.
pub type Callback = Box<dyn Fn() + Send + Sync + 'static>;

/// An opaque 64-bit point in time.
///
/// Ordering is plain unsigned comparison. Values close to `u64::MAX` are not
/// protected against wraparound.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Time(u64);

impl Time {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The underlying unit of time.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether this time is strictly before `other`.
    pub const fn before(self, other: Time) -> bool {
        self.0 < other.0
    }

    /// Whether this time is strictly after `other`.
    pub const fn after(self, other: Time) -> bool {
        self.0 > other.0
    }
}

impl From<u64> for Time {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Time> for u64 {
    fn from(time: Time) -> Self {
        time.0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Nanoseconds since the Unix epoch, or zero if the system clock is set before it.
pub(crate) fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(as_nanos)
        .unwrap_or_default()
}

/// Saturating conversion of a duration to whole nanoseconds.
pub(crate) fn as_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Saturating conversion of a duration to whole microseconds.
pub(crate) fn as_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Saturating conversion of a duration to whole milliseconds.
pub(crate) fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_ordering() {
        let early = Time::new(10);
        let late = Time::new(11);

        assert!(early.before(late));
        assert!(late.after(early));
        assert!(!early.before(early));
        assert!(!early.after(early));
        assert_eq!(late.value(), 11);
    }

    #[test]
    fn test_time_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Time::new(42)).unwrap();
        assert_eq!(json, "42");

        let parsed: Time = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, Time::new(7));
    }

    #[test]
    fn test_duration_conversions_saturate() {
        assert_eq!(as_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(as_micros(Duration::from_millis(2)), 2000);
        assert_eq!(as_nanos(Duration::MAX), u64::MAX);
        assert_eq!(as_micros(Duration::MAX), u64::MAX);
        assert_eq!(as_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_unix_nanos_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(unix_nanos() > 1_577_836_800_000_000_000);
    }
}
