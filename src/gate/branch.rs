//! Two-branch gate over an atomic side bit.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::gate::{Gate, Side};

type Branch<E> = Box<dyn Fn() -> Result<(), E> + Send + Sync>;

pub struct BranchGate<E> {
    left: Branch<E>,
    right: Branch<E>,
    side: AtomicU8,
}

impl<E> BranchGate<E> {
    pub fn new<L, R>(left: L, right: R) -> Self
    where
        L: Fn() -> Result<(), E> + Send + Sync + 'static,
        R: Fn() -> Result<(), E> + Send + Sync + 'static,
    {
        Self {
            left: Box::new(left),
            right: Box::new(right),
            side: AtomicU8::new(Side::Left as u8),
        }
    }
}

impl<E> Gate for BranchGate<E> {
    type Error = E;

    fn switch(&self) -> bool {
        let mut current = self.side.load(Ordering::Acquire);
        loop {
            let next = Side::from(current).flip();
            match self.side.compare_exchange_weak(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next == Side::Left,
                Err(actual) => current = actual,
            }
        }
    }

    fn run(&self) -> Result<(), E> {
        match self.side() {
            Side::Left => (self.left)(),
            Side::Right => (self.right)(),
        }
    }

    fn side(&self) -> Side {
        Side::from(self.side.load(Ordering::Acquire))
    }
}

impl<E> fmt::Debug for BranchGate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchGate").field("side", &self.side()).finish()
    }
}
