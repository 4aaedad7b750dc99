//! Logical and wall clocks.
//!
//! # Data Flow
//! ```text
//! Local event   → increment() → Time stamped on the event
//! Remote event  → caller transmits Time → witness(Time) on receipt
//! Comparison    → Time::before / Time::after
//! ```
//!
//! # Design Decisions
//! - One atomic 64-bit word per clock, updated with compare-and-swap loops
//! - witness(v) always leaves the clock strictly past both its old value and v
//! - Cloning a clock copies its value; the copy shares nothing with the original
//! - Transport of Time values between processes belongs to the caller

pub mod lamport;
pub mod wall;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResilienceError;
use crate::time::Time;

pub use lamport::LamportClock;
pub use wall::WallClock;

/// A thread-safe clock.
pub trait Clock: Send + Sync {
    /// The current value of the clock.
    fn now(&self) -> Time;

    /// Advance the clock by one and return the new value.
    fn increment(&self) -> Time;

    /// Move the local clock past a value witnessed from another process.
    fn witness(&self, other: Time);

    /// An independent clock starting at this clock's current value.
    fn clone_clock(&self) -> Box<dyn Clock>;

    /// Reset the clock to its starting point.
    fn reset(&self);
}

impl Clone for Box<dyn Clock> {
    fn clone(&self) -> Self {
        self.clone_clock()
    }
}

/// Clock strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockKind {
    #[default]
    Lamport,
    Wall,
}

impl ClockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClockKind::Lamport => "lamport",
            ClockKind::Wall => "wall",
        }
    }
}

impl fmt::Display for ClockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClockKind {
    type Err = ResilienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lamport" => Ok(ClockKind::Lamport),
            "wall" => Ok(ClockKind::Wall),
            other => Err(ResilienceError::unknown("clock", other)),
        }
    }
}

/// Create a clock of the given kind.
pub fn new(kind: ClockKind) -> Box<dyn Clock> {
    match kind {
        ClockKind::Lamport => Box::new(LamportClock::new()),
        ClockKind::Wall => Box::new(WallClock::new()),
    }
}
