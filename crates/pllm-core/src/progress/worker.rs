//! Background task that folds dispatcher events and publishes snapshots.

use tokio::sync::mpsc;

use crate::dispatch::ChunkEvent;

use super::tracker::{ProgressSnapshot, ProgressTracker};

/// Consume events until every sender is dropped, applying each to `tracker`.
/// After every event a snapshot is offered to `stats_tx` (dropped if the
/// renderer is behind). Returns the final tracker. Spawn this with tokio::spawn.
pub async fn run_progress_loop(
    mut events: mpsc::UnboundedReceiver<ChunkEvent>,
    mut tracker: ProgressTracker,
    stats_tx: Option<mpsc::Sender<ProgressSnapshot>>,
) -> ProgressTracker {
    while let Some(event) = events.recv().await {
        tracker.apply(&event);
        if let Some(ref tx) = stats_tx {
            let _ = tx.try_send(tracker.snapshot());
        }
    }
    tracker
}
