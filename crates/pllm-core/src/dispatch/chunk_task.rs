//! Drive one chunk through the worker to a terminal Result.

use std::path::Path;
use std::sync::Arc;

use crate::error::PipelineError;
use crate::retry::RetryDecision;
use crate::segmenter::Chunk;
use crate::storage;

use super::envelope::{failure_body, success_body};
use super::events::{ChunkEvent, ChunkStatus, EventSink};
use super::invoke::run_attempt;
use super::template::TemplateVars;
use super::{ChunkOutcome, DispatchConfig};

/// Attempts the chunk until success or the retry budget runs out, writes the
/// Result file, then removes the chunk's work unit.
pub(super) async fn process_chunk(
    chunk: Chunk,
    cfg: Arc<DispatchConfig>,
    events: EventSink,
) -> Result<ChunkOutcome, PipelineError> {
    let index = chunk.index;
    events.emit(ChunkEvent::ChunkStarted { index });

    let vars = TemplateVars {
        buffer: chunk.path.to_string_lossy().into_owned(),
        template: cfg.template.clone(),
        instructions: cfg.instructions.clone(),
    };
    let command = cfg.command.render(&vars);
    let output_path = storage::result_path(&cfg.output_dir, index);

    let mut attempt = 0u32;
    loop {
        events.emit(ChunkEvent::AttemptStarted { index, attempt });
        let result = run_attempt(index, attempt, &command, &vars).await;
        events.emit(ChunkEvent::AttemptFinished {
            index,
            attempt,
            duration: result.duration,
            success: result.succeeded(),
        });

        if result.succeeded() {
            let body = success_body(&chunk, &result.stdout);
            let outcome = ChunkOutcome {
                index,
                status: ChunkStatus::Success,
                attempts: attempt + 1,
            };
            return finish(&chunk.path, &output_path, &body, outcome, &events).await;
        }

        tracing::debug!(
            chunk = index,
            attempt,
            exit_code = ?result.exit_code,
            "worker attempt failed"
        );

        match cfg.retry.decide(attempt) {
            RetryDecision::GiveUp => {
                let attempts = attempt + 1;
                tracing::warn!(
                    chunk = index,
                    attempts,
                    exit_code = ?result.exit_code,
                    "chunk failed after exhausting retries"
                );
                let body = failure_body(index, attempts, &result.stdout, &result.stderr);
                let outcome = ChunkOutcome {
                    index,
                    status: ChunkStatus::Failed,
                    attempts,
                };
                return finish(&chunk.path, &output_path, &body, outcome, &events).await;
            }
            RetryDecision::RetryAfter(wait) => {
                events.emit(ChunkEvent::RetryScheduled {
                    index,
                    retry: attempt + 1,
                    max_retries: cfg.retry.max_retries,
                    wait,
                });
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}

/// Persist the Result, drop the work unit, report the terminal state.
async fn finish(
    unit_path: &Path,
    output_path: &Path,
    body: &str,
    outcome: ChunkOutcome,
    events: &EventSink,
) -> Result<ChunkOutcome, PipelineError> {
    storage::write_atomic(output_path, body.as_bytes()).await?;
    storage::remove_if_exists(unit_path).await?;
    events.emit(ChunkEvent::ChunkFinished {
        index: outcome.index,
        status: outcome.status,
        attempts: outcome.attempts,
    });
    Ok(outcome)
}
