//! Countdown to a fixed end instant.
//!
//! [`TimeRemaining`] is a pure function of the end instant and "now".
//! [`Countdown`] recomputes it once a second on a background task and
//! publishes every value through a watch channel until the end is reached.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

pub const TICK: Duration = Duration::from_secs(1);

/// Source of "now" for countdowns.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRemaining {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub is_expired: bool,
}

impl TimeRemaining {
    pub const EXPIRED: TimeRemaining = TimeRemaining { hours: 0, minutes: 0, seconds: 0, is_expired: true };

    /// Expired exactly when `end <= now`.
    pub fn between(end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let ms = (end - now).num_milliseconds();
        if end <= now {
            return Self::EXPIRED;
        }
        TimeRemaining {
            hours: ms / 3_600_000,
            minutes: (ms % 3_600_000) / 60_000,
            seconds: (ms % 60_000) / 1000,
            is_expired: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Counting(TimeRemaining),
    Expired,
}

impl From<TimeRemaining> for CountdownState {
    fn from(remaining: TimeRemaining) -> Self {
        if remaining.is_expired {
            CountdownState::Expired
        } else {
            CountdownState::Counting(remaining)
        }
    }
}

/// Ticking countdown. Dropping the handle stops the background task.
pub struct Countdown {
    end: DateTime<Utc>,
    rx: watch::Receiver<TimeRemaining>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Publishes the initial value immediately, then one value per [`TICK`].
    /// Ticking stops after the first expired value.
    pub fn start(end: DateTime<Utc>, clock: Arc<dyn Clock>) -> Self {
        let initial = TimeRemaining::between(end, clock.now());
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            if initial.is_expired {
                return;
            }
            let mut ticker = interval(TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let remaining = TimeRemaining::between(end, clock.now());
                if tx.send(remaining).is_err() {
                    break;
                }
                if remaining.is_expired {
                    tracing::debug!(%end, "Countdown expired");
                    break;
                }
            }
        });

        tracing::debug!(%end, ?initial, "Countdown started");
        Self { end, rx, task }
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn current(&self) -> TimeRemaining {
        *self.rx.borrow()
    }

    pub fn state(&self) -> CountdownState {
        self.current().into()
    }

    /// Receiver that wakes on every tick; closes once ticking has stopped.
    pub fn subscribe(&self) -> watch::Receiver<TimeRemaining> {
        self.rx.clone()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
