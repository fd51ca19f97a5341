//! Periodic re-evaluation while a clock runs

use std::future::pending;
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Cancellable interval.
///
/// While stopped, [`Ticker::tick`] never resolves, so a stopped ticker can
/// sit in a `select!` without firing.
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Ticker {
            period,
            interval: None,
        }
    }

    /// Start ticking one period from now. No-op if already running.
    pub fn start(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    /// Cancel immediately; pending ticks are dropped
    pub fn stop(&mut self) {
        self.interval = None;
    }

    /// Start or stop to match `running`
    pub fn set_running(&mut self, running: bool) {
        if running {
            self.start();
        } else {
            self.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) -> Instant {
        match self.interval.as_mut() {
            Some(interval) => interval.tick().await,
            None => pending().await,
        }
    }
}
