use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::fetch::FailureKind;

use super::SnapshotOrchestrator;

/// Result of one periodic refresh, published to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRound {
    pub round: u64,
    /// Records in the cache after the round.
    pub cached_records: usize,
    pub failure: Option<FailureKind>,
}

/// Handle to a periodic refresh task; dropping it stops the task.
pub struct RefreshHandle {
    task: JoinHandle<()>,
    rounds: watch::Receiver<Option<RefreshRound>>,
}

impl RefreshHandle {
    pub fn subscribe(&self) -> watch::Receiver<Option<RefreshRound>> {
        self.rounds.clone()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Refresh the cache on a fixed cadence, starting immediately.
///
/// Rounds never overlap; a slow round delays the next tick instead of
/// bursting to catch up.
pub fn spawn_periodic_refresh(
    orchestrator: SnapshotOrchestrator,
    every: Duration,
) -> RefreshHandle {
    let (tx, rx) = watch::channel(None);

    let task = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut round = 0u64;

        loop {
            ticker.tick().await;
            round += 1;

            let failure = orchestrator.refresh().await.err().map(|err| err.kind());
            let cached_records = orchestrator.cache().get().len();
            log::debug!(
                "Refresh round {} done: {} cached records{}",
                round,
                cached_records,
                failure
                    .map(|kind| format!(", failed ({kind})"))
                    .unwrap_or_default()
            );

            if tx
                .send(Some(RefreshRound {
                    round,
                    cached_records,
                    failure,
                }))
                .is_err()
            {
                log::debug!("Refresh subscribers gone; stopping periodic refresh");
                break;
            }
        }
    });

    RefreshHandle { task, rounds: rx }
}
