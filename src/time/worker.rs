//! Background worker shared by the wall timer and wall ticker.
//!
//! Each worker owns a thread running a current-thread tokio runtime. The
//! runtime only drives one sleep and one control channel, so the loop below is
//! the whole scheduler.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::error::{ResilienceError, ResilienceResult};
use crate::time::{as_millis, Callback};

/// When the worker runs its callback.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Schedule {
    /// Every period until stopped.
    Every(Duration),
    /// Once per arming. The worker starts armed; `rearm` schedules another expiry.
    Once(Duration),
}

impl Schedule {
    fn period(self) -> Duration {
        match self {
            Schedule::Every(period) | Schedule::Once(period) => period,
        }
    }
}

enum Control {
    Rearm,
    Stop,
}

/// Handle to a running worker thread.
pub(crate) struct Worker {
    name: &'static str,
    control: mpsc::UnboundedSender<Control>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// Start the worker. The first expiry is one period from now.
    pub(crate) fn spawn(
        name: &'static str,
        schedule: Schedule,
        callback: Callback,
    ) -> ResilienceResult<Self> {
        let period = schedule.period();
        if period.is_zero() {
            return Err(ResilienceError::ZeroPeriod);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let (control, commands) = mpsc::unbounded_channel();

        let thread = thread::Builder::new()
            .name(format!("resilience-{name}"))
            .spawn(move || runtime.block_on(drive(schedule, callback, commands)))?;

        tracing::debug!(
            worker = name,
            period_ms = as_millis(period),
            "Background worker started"
        );

        Ok(Self {
            name,
            control,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Schedule the next expiry one period from now, replacing any pending one.
    pub(crate) fn rearm(&self) {
        // A send error means the worker already exited.
        let _ = self.control.send(Control::Rearm);
    }

    /// Ask the worker to exit and wait until it has.
    ///
    /// Returns once no callback is running and none will run again. Calling it
    /// more than once is a no-op.
    pub(crate) fn stop(&self) {
        let Some(thread) = self.thread.lock().take() else {
            return;
        };
        let _ = self.control.send(Control::Stop);

        if thread.thread().id() == thread::current().id() {
            // Stopped from inside our own callback: joining would deadlock. The
            // loop picks up the stop request as soon as the callback returns.
            tracing::debug!(worker = self.name, "Background worker stopping itself");
            return;
        }

        if thread.join().is_err() {
            tracing::warn!(worker = self.name, "Background worker callback panicked");
        }
        tracing::debug!(worker = self.name, "Background worker stopped");
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn drive(
    schedule: Schedule,
    callback: Callback,
    mut commands: mpsc::UnboundedReceiver<Control>,
) {
    let period = schedule.period();
    let sleep = time::sleep(period);
    tokio::pin!(sleep);
    let mut armed = true;

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Control::Rearm) => {
                    sleep.as_mut().reset(Instant::now() + period);
                    armed = true;
                }
                Some(Control::Stop) | None => break,
            },
            () = &mut sleep, if armed => {
                callback();
                match schedule {
                    Schedule::Every(_) => {
                        // Skip ticks missed behind a slow callback instead of bursting.
                        let now = Instant::now();
                        let mut next = sleep.deadline() + period;
                        if next <= now {
                            next = now + period;
                        }
                        sleep.as_mut().reset(next);
                    }
                    Schedule::Once(_) => armed = false,
                }
            }
        }
    }
}
