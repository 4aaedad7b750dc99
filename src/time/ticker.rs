//! Periodic tickers.

use std::time::Duration;

use crate::error::ResilienceResult;
use crate::time::worker::{Schedule, Worker};
use crate::time::Callback;

/// Delivers ticks at a fixed interval until stopped.
pub trait Ticker: Send + Sync {
    /// Turn the ticker off. After this returns no more ticks are delivered.
    fn stop(&self);
}

/// Creates tickers for components that need periodic work.
pub trait TickerFactory: Send + Sync {
    fn start(&self, period: Duration, callback: Callback) -> ResilienceResult<Box<dyn Ticker>>;
}

/// Ticker backed by the system clock and a background worker.
pub struct WallTicker {
    worker: Worker,
}

impl WallTicker {
    /// Start ticking. The first tick is one period from now.
    pub fn new(period: Duration, callback: Callback) -> ResilienceResult<Self> {
        let worker = Worker::spawn("ticker", Schedule::Every(period), callback)?;
        Ok(Self { worker })
    }
}

impl Ticker for WallTicker {
    fn stop(&self) {
        self.worker.stop();
    }
}

/// Produces [`WallTicker`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallTickerFactory;

impl TickerFactory for WallTickerFactory {
    fn start(&self, period: Duration, callback: Callback) -> ResilienceResult<Box<dyn Ticker>> {
        Ok(Box::new(WallTicker::new(period, callback)?))
    }
}
