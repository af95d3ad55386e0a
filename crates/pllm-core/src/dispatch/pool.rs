//! Bounded worker pool: keep up to `concurrency` chunk tasks alive, refill
//! from the queue in index order as tasks finish.

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::error::PipelineError;
use crate::segmenter::Chunk;

use super::chunk_task::process_chunk;
use super::events::EventSink;
use super::{DispatchConfig, DispatchSummary};

/// Runs every chunk to a terminal state with at most `cfg.concurrency`
/// chunks in flight. Returns once all Results are written.
///
/// On an infrastructure error the remaining tasks are dropped (which kills
/// their worker processes) and the error is returned.
pub async fn dispatch_all(
    chunks: Vec<Chunk>,
    cfg: DispatchConfig,
    events: EventSink,
) -> Result<DispatchSummary, PipelineError> {
    let limit = cfg.concurrency.max(1);
    let cfg = Arc::new(cfg);
    let mut summary = DispatchSummary {
        total: chunks.len(),
        ..Default::default()
    };
    let mut queue = chunks.into_iter();
    let mut join_set = JoinSet::new();

    tracing::info!(
        chunks = summary.total,
        concurrency = limit,
        "dispatching chunks"
    );

    loop {
        while join_set.len() < limit {
            let Some(chunk) = queue.next() else {
                break;
            };
            join_set.spawn(process_chunk(chunk, Arc::clone(&cfg), events.clone()));
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let outcome = res.map_err(|e| PipelineError::TaskJoin(e.to_string()))??;
        tracing::debug!(
            chunk = outcome.index,
            status = outcome.status.as_str(),
            attempts = outcome.attempts,
            "chunk finished"
        );
        summary.record(&outcome);
    }

    Ok(summary)
}
