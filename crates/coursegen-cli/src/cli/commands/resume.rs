//! `coursegen resume` – continue a persisted run in rate-limited batches.
//!
//! With `--curriculum`, the catalog is re-enumerated and merged with the
//! persisted tasks by (subject, title) identity, so newly added templates
//! join the pending set and completed tasks stay done. Without it, the
//! persisted list continues as-is. Either way, tasks orphaned in-progress by
//! a crash are requeued. Missing prior state is fatal here, unlike `start`.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::sync::Arc;

use coursegen_core::catalog::{self, CatalogFilter};
use coursegen_core::config::GenConfig;
use coursegen_core::scheduler::{self, BatchOptions};
use coursegen_core::state::{resume, ProgressStore};
use coursegen_core::task::TaskStatus;

use super::{open_store, print_summary, run_context};

pub async fn run_resume(
    cfg: &GenConfig,
    curriculum_path: Option<&Path>,
    batch_size: Option<usize>,
) -> Result<()> {
    let store = open_store(cfg)?;
    let mut state = store
        .load()
        .context("resume requires readable prior state")?
        .ok_or_else(|| anyhow!("no persisted run to resume; run `coursegen start` first"))?;
    state.reconcile();

    let mut tasks = match curriculum_path {
        Some(path) => {
            let curriculum = catalog::load_curriculum(path)?;
            let fresh =
                catalog::build_tasks(&curriculum, &CatalogFilter::default(), cfg.priority, None)?;
            resume::merge_prior(fresh, state.tasks)
        }
        None => {
            let mut tasks = state.tasks;
            resume::requeue_stale(&mut tasks);
            tasks
        }
    };

    let pending = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .count();
    if pending == 0 {
        println!("Nothing to resume; every task is already terminal.");
        return Ok(());
    }
    tracing::info!(pending, total = tasks.len(), "resuming run");

    let ctx = run_context(cfg, Arc::clone(&store)).with_run_start(state.progress.start_time);
    let opts = BatchOptions {
        batch_size: batch_size.unwrap_or(cfg.batch_size),
        batch_delay: cfg.batch_delay(),
    };

    let summary = scheduler::run_batches(&mut tasks, &ctx, &opts).await?;
    print_summary(&summary);
    Ok(())
}
