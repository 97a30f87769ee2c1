//! Operator-triggered retry: reset failed tasks to pending and resubmit them
//! through the batch scheduler.
//!
//! Retries are manual and uncapped: nothing stops an operator from retrying
//! the same task forever. That mirrors how the generation service is actually
//! operated (failures are usually transient capacity problems) and keeps the
//! persisted task shape free of attempt counters.

use thiserror::Error;

use crate::scheduler::{run_batches, BatchOptions, PartitionError, RunContext, RunSummary};
use crate::state::{PersistenceError, ProgressStore};
use crate::task::TaskStatus;

#[derive(Debug, Error)]
pub enum RetryError {
    /// `retry` without prior persisted state has nothing to retry.
    #[error("no persisted run found; nothing to retry")]
    NoPriorRun,
    /// Prior state exists but holds no failed tasks.
    #[error("no failed tasks to retry")]
    NoFailedTasks,
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Partition(#[from] PartitionError),
}

/// Reset every failed task in the persisted state to pending (clearing error
/// and timestamps), persist the reset, then run the reduced pending set in
/// batches. Tasks that never failed are untouched.
pub async fn retry_failed(ctx: &RunContext, opts: &BatchOptions) -> Result<RunSummary, RetryError> {
    let mut state = ctx.store.load()?.ok_or(RetryError::NoPriorRun)?;
    state.reconcile();

    let mut reset = 0;
    for task in state
        .tasks
        .iter_mut()
        .filter(|t| t.status == TaskStatus::Failed)
    {
        task.reset_to_pending();
        reset += 1;
    }
    if reset == 0 {
        return Err(RetryError::NoFailedTasks);
    }
    tracing::info!(reset, "failed tasks reset to pending for retry");

    // Persist the reset before running so an immediate crash still leaves the
    // retried tasks pending. Best-effort, like all mid-run writes.
    if let Err(e) = ctx.store.save(&state) {
        tracing::warn!(error = %e, "could not persist retry reset; continuing");
    }

    let ctx = RunContext {
        generator: ctx.generator.clone(),
        store: ctx.store.clone(),
        pacer: ctx.pacer.clone(),
        run_start: state.progress.start_time,
    };
    let mut tasks = state.tasks;
    let summary = run_batches(&mut tasks, &ctx, opts).await?;
    Ok(summary)
}
