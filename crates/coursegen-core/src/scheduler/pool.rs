//! Static-partition strategy: N long-lived workers, each running its
//! contiguous slice of the pending set strictly in order.
//!
//! No work stealing: partitioning is by count, not duration, so uneven task
//! latency can leave some workers idle while others are still busy. That is
//! a deliberate simplicity-over-load-balance tradeoff. After every task,
//! success or failure, a worker sleeps the inter-task cooldown to avoid
//! saturating the generation service.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use super::coordinator::Coordinator;
use super::event::{TaskTransition, TransitionKind};
use super::partition::{partition_slices, PartitionError};
use super::{RunContext, RunSummary};
use crate::task::{TaskKey, TaskSpec, TaskStatus};

/// Options for the worker-pool strategy.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub workers: usize,
    /// Pause after every task, success or failure.
    pub task_cooldown: Duration,
}

/// Run every pending task through a static worker partition.
///
/// Terminal task states, worker statuses, and the snapshot are persisted via
/// the context's store on every transition; the final task list is left in
/// `tasks` when this returns.
pub async fn run_worker_pool(
    tasks: &mut Vec<crate::task::Task>,
    ctx: &RunContext,
    opts: &PoolOptions,
) -> Result<RunSummary, PartitionError> {
    let started = Instant::now();

    let pending: Vec<(TaskKey, TaskSpec)> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .map(|t| (t.key(), t.spec()))
        .collect();
    let slices = partition_slices(pending.len(), opts.workers)?;
    tracing::info!(
        pending = pending.len(),
        workers = opts.workers,
        cooldown_ms = opts.task_cooldown.as_millis() as u64,
        "starting worker pool"
    );

    let mut coordinator = Coordinator::new(tasks, ctx.store.as_ref(), ctx.run_start, opts.workers);
    coordinator.persist(Utc::now());

    let (tx, mut rx) = tokio::sync::mpsc::channel::<TaskTransition>(64);
    let mut join_set = JoinSet::new();
    for (worker_id, slice) in slices.into_iter().enumerate() {
        if slice.is_empty() {
            continue;
        }
        let assigned: Vec<(TaskKey, TaskSpec)> = pending[slice].to_vec();
        let generator = Arc::clone(&ctx.generator);
        let pacer = Arc::clone(&ctx.pacer);
        let cooldown = opts.task_cooldown;
        let tx = tx.clone();
        join_set.spawn(async move {
            for (key, spec) in assigned {
                let send = |kind| {
                    let tx = tx.clone();
                    let key = key.clone();
                    async move {
                        // The coordinator outlives the workers; a closed
                        // channel only happens on abnormal shutdown.
                        let _ = tx
                            .send(TaskTransition {
                                worker_id,
                                key,
                                kind,
                            })
                            .await;
                    }
                };
                send(TransitionKind::Started).await;
                match generator.generate(&spec).await {
                    Ok(artifact_id) => send(TransitionKind::Completed { artifact_id }).await,
                    Err(e) => {
                        send(TransitionKind::Failed {
                            error: e.to_string(),
                        })
                        .await
                    }
                }
                pacer.sleep(cooldown).await;
            }
        });
    }
    drop(tx);

    while let Some(transition) = rx.recv().await {
        coordinator.apply(transition);
    }
    while let Some(res) = join_set.join_next().await {
        if let Err(e) = res {
            tracing::warn!(error = %e, "worker task join failed");
        }
    }

    coordinator.persist(Utc::now());
    Ok(coordinator.finish(started.elapsed()))
}
