//! Execution gates.
//!
//! A gate holds two branches and runs whichever one it currently points at.
//! Flipping and running are separate calls; nothing flips implicitly.

pub mod branch;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResilienceError;

pub use branch::BranchGate;

/// Which branch a gate points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Side {
    #[default]
    Left = 0,
    Right = 1,
}

impl Side {
    pub fn flip(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl From<u8> for Side {
    fn from(v: u8) -> Self {
        match v {
            1 => Side::Right,
            _ => Side::Left,
        }
    }
}

/// Switches between two branches before running one of them.
pub trait Gate: Send + Sync {
    type Error;

    /// Flip to the other branch. Returns `true` when the gate now points left.
    fn switch(&self) -> bool;

    /// Run the current branch.
    fn run(&self) -> Result<(), Self::Error>;

    fn side(&self) -> Side;
}

/// Gate strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    #[default]
    Branch,
}

impl GateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GateKind::Branch => "branch",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GateKind {
    type Err = ResilienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "branch" => Ok(GateKind::Branch),
            other => Err(ResilienceError::unknown("gate", other)),
        }
    }
}

/// Create a gate of the given kind, starting on the left branch.
pub fn new<E, L, R>(kind: GateKind, left: L, right: R) -> Box<dyn Gate<Error = E>>
where
    E: 'static,
    L: Fn() -> Result<(), E> + Send + Sync + 'static,
    R: Fn() -> Result<(), E> + Send + Sync + 'static,
{
    match kind {
        GateKind::Branch => Box::new(BranchGate::new(left, right)),
    }
}
