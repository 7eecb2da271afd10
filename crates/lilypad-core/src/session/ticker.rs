//! Recurring one-second tick source.
//!
//! `schedule()` spawns a tokio task that sends a [`Tick`] down a channel
//! every interval; `cancel()` aborts it. Each schedule bumps a generation
//! number carried by its ticks, so a tick that was already queued when the
//! ticker was cancelled or rescheduled can be recognised and dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

pub struct Ticker {
    interval: Duration,
    tx: mpsc::UnboundedSender<Tick>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl Ticker {
    /// Create an idle ticker and the receiving end of its ticks.
    pub fn new(interval: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ticker = Self {
            interval,
            tx,
            handle: None,
            generation: 0,
        };
        (ticker, rx)
    }

    pub fn is_scheduled(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether `tick` came from the schedule that is live right now.
    pub fn is_current(&self, tick: Tick) -> bool {
        self.is_scheduled() && tick.generation == self.generation
    }

    /// Start a fresh schedule, replacing any running one. The first tick
    /// arrives one full interval from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let period = self.interval;
        let tx = self.tx.clone();
        let start = Instant::now() + period;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
        tracing::debug!(generation, "ticker scheduled");
        generation
    }

    /// Stop the current schedule. Returns `false` if nothing was scheduled.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                tracing::debug!(generation = self.generation, "ticker cancelled");
                true
            }
            None => false,
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
