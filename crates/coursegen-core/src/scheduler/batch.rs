//! Bounded batch fan-out strategy: drain the pending set in fixed-size
//! concurrent groups with an inter-batch delay as backpressure.
//!
//! The barrier contract: batch k+1 never begins before every task of batch k
//! has reached a terminal state and the delay has elapsed. An interrupted run
//! leaves in-flight tasks wherever they got to; un-started batches stay
//! pending, and the persisted state is authoritative for the next resume.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use super::coordinator::Coordinator;
use super::event::{TaskTransition, TransitionKind};
use super::partition::PartitionError;
use super::{RunContext, RunSummary};
use crate::task::{TaskKey, TaskSpec, TaskStatus};

/// Options for the batch strategy.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Concurrent fan-out per batch.
    pub batch_size: usize,
    /// Pause between batches (not after the last one).
    pub batch_delay: Duration,
}

/// Run every pending task in concurrency-bounded batches.
pub async fn run_batches(
    tasks: &mut Vec<crate::task::Task>,
    ctx: &RunContext,
    opts: &BatchOptions,
) -> Result<RunSummary, PartitionError> {
    let started = Instant::now();

    if opts.batch_size == 0 {
        return Err(PartitionError::InvalidConcurrency);
    }
    let pending: Vec<(TaskKey, TaskSpec)> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .map(|t| (t.key(), t.spec()))
        .collect();
    if pending.is_empty() {
        return Err(PartitionError::NoPendingTasks);
    }
    let batch_count = pending.len().div_ceil(opts.batch_size);
    tracing::info!(
        pending = pending.len(),
        batch_size = opts.batch_size,
        batches = batch_count,
        delay_secs = opts.batch_delay.as_secs(),
        "starting batch scheduler"
    );

    let mut coordinator =
        Coordinator::new(tasks, ctx.store.as_ref(), ctx.run_start, opts.batch_size);
    coordinator.persist(Utc::now());

    for (batch_index, batch) in pending.chunks(opts.batch_size).enumerate() {
        if batch_index > 0 {
            tracing::debug!(
                batch = batch_index + 1,
                of = batch_count,
                "inter-batch delay"
            );
            ctx.pacer.sleep(opts.batch_delay).await;
        }

        let (tx, mut rx) = tokio::sync::mpsc::channel::<TaskTransition>(64);
        let mut join_set = JoinSet::new();
        for (slot, (key, spec)) in batch.iter().cloned().enumerate() {
            let generator = Arc::clone(&ctx.generator);
            let tx = tx.clone();
            join_set.spawn(async move {
                let _ = tx
                    .send(TaskTransition {
                        worker_id: slot,
                        key: key.clone(),
                        kind: TransitionKind::Started,
                    })
                    .await;
                let kind = match generator.generate(&spec).await {
                    Ok(artifact_id) => TransitionKind::Completed { artifact_id },
                    Err(e) => TransitionKind::Failed {
                        error: e.to_string(),
                    },
                };
                let _ = tx
                    .send(TaskTransition {
                        worker_id: slot,
                        key,
                        kind,
                    })
                    .await;
            });
        }
        drop(tx);

        // Join on the whole batch: the channel closes only once every batch
        // task has sent its terminal transition and exited.
        while let Some(transition) = rx.recv().await {
            coordinator.apply(transition);
        }
        while let Some(res) = join_set.join_next().await {
            if let Err(e) = res {
                tracing::warn!(error = %e, "batch task join failed");
            }
        }
    }

    coordinator.persist(Utc::now());
    Ok(coordinator.finish(started.elapsed()))
}
