use crate::ChainReader;
use std::time::Duration;
use tokio::time::{interval, timeout_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default length of a chain observation window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3);

/// Default interval between chain id reads.
pub const DEFAULT_POLL: Duration = Duration::from_millis(500);

/// Chain ids seen during an observation window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainObservation {
    /// The chain at the start of the window, if it could be read.
    pub initial: Option<u64>,
    /// Each distinct chain switched to, in order.
    pub changes: Vec<u64>,
}

impl ChainObservation {
    /// The last chain seen.
    pub fn last(&self) -> Option<u64> {
        self.changes.last().copied().or(self.initial)
    }
}

/// Poll the reader's chain id for a bounded window and log each change.
///
/// Diagnostic only. Read failures are logged and skipped. The window is
/// never extended.
pub async fn observe_chain_changes<R>(
    reader: &R,
    window: Duration,
    poll: Duration,
) -> ChainObservation
where
    R: ChainReader + Sync,
{
    let deadline = Instant::now() + window;
    let mut ticks = interval(poll);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut observation = ChainObservation::default();
    let mut current = None;

    loop {
        if timeout_at(deadline, ticks.tick()).await.is_err() {
            break;
        }
        let chain_id = match reader.chain_id().await {
            Ok(chain_id) => chain_id,
            Err(e) => {
                debug!(%e, "chain id unavailable");
                continue;
            }
        };
        match current {
            None => observation.initial = Some(chain_id),
            Some(previous) if previous != chain_id => {
                info!(previous, chain_id, "chain changed");
                observation.changes.push(chain_id);
            }
            Some(_) => {}
        }
        current = Some(chain_id);
    }

    observation
}
