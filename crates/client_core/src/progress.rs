//! Cosmetic progress rotation shown while an action is pending.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::warn;

use crate::ui::ActionUi;

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressScript {
    /// One fixed line, no timer.
    Static(&'static str),
    Cycle {
        messages: &'static [&'static str],
        fallback: &'static str,
        /// Show the first message at start instead of on the first tick.
        lead_immediately: bool,
    },
}

/// Ordered messages followed by a fallback shown forever.
///
/// `cursor` never decreases and never passes `messages.len()`.
#[derive(Debug, Clone)]
pub struct ProgressCycle {
    messages: Vec<String>,
    fallback: String,
    cursor: usize,
}

impl ProgressCycle {
    pub fn new<I, S>(messages: I, fallback: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
            fallback: fallback.into(),
            cursor: 0,
        }
    }

    pub fn advance(&mut self) -> &str {
        match self.messages.get(self.cursor) {
            Some(message) => {
                self.cursor += 1;
                message
            }
            None => &self.fallback,
        }
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn is_exhausted(&self) -> bool {
        self.cursor >= self.messages.len()
    }
}

/// Repeating timer that writes the next [`ProgressCycle`] line to the UI.
///
/// The first write happens one `period` after [`ProgressTimer::start`].
/// Once [`ProgressTimer::stop`] returns, the task has exited and will not
/// touch the UI again. Dropping the handle also ends the task, without
/// waiting for it.
pub struct ProgressTimer {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
    ticks: Arc<AtomicU64>,
}

impl ProgressTimer {
    pub fn start(mut cycle: ProgressCycle, ui: Arc<dyn ActionUi>, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let ticks = Arc::new(AtomicU64::new(0));
        let task_ticks = ticks.clone();
        let first_tick = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {
                        ui.set_progress_message(cycle.advance());
                        task_ticks.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });

        Self {
            stop_tx,
            handle,
            ticks,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Stops the timer and waits for its task to finish. Returns the number
    /// of ticks that reached the UI.
    pub async fn stop(self) -> u64 {
        let Self {
            stop_tx,
            handle,
            ticks,
        } = self;
        let _ = stop_tx.send(());
        if let Err(err) = handle.await {
            warn!(error = %err, "progress: timer task ended abnormally");
        }
        ticks.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "tests/progress_tests.rs"]
mod tests;
