//! `coursegen start` (and the `subject`/`level` shortcuts) – enumerate the
//! curriculum and run a fresh pass through the static worker pool.

use anyhow::Result;
use std::path::Path;

use coursegen_core::catalog::{self, CatalogFilter, Priority};
use coursegen_core::config::GenConfig;
use coursegen_core::scheduler::{self, PoolOptions};

use super::{open_store, print_summary, run_context};

pub async fn run_start(
    cfg: &GenConfig,
    curriculum_path: &Path,
    filter: CatalogFilter,
    priority: Option<Priority>,
    seed: Option<u64>,
    workers: Option<usize>,
) -> Result<()> {
    let curriculum = catalog::load_curriculum(curriculum_path)?;
    let priority = priority.unwrap_or(cfg.priority);
    let mut tasks = catalog::build_tasks(&curriculum, &filter, priority, seed)?;
    tracing::info!(
        tasks = tasks.len(),
        %priority,
        "catalog enumerated from {}",
        curriculum_path.display()
    );

    let store = open_store(cfg)?;
    let ctx = run_context(cfg, store);
    let opts = PoolOptions {
        workers: workers.unwrap_or(cfg.workers),
        task_cooldown: cfg.task_cooldown(),
    };

    let summary = scheduler::run_worker_pool(&mut tasks, &ctx, &opts).await?;
    print_summary(&summary);
    Ok(())
}
