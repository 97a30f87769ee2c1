//! Subcommand implementations.

mod report;
mod resume;
mod retry;
mod start;
mod status;

pub use report::run_report;
pub use resume::run_resume;
pub use retry::run_retry;
pub use start::run_start;
pub use status::run_status;

use anyhow::Result;
use std::sync::Arc;

use coursegen_core::config::GenConfig;
use coursegen_core::generator::HttpGenerator;
use coursegen_core::scheduler::{RunContext, RunSummary, TokioPacer};
use coursegen_core::state::JsonStateStore;

/// Open the state store at the configured (or default XDG) path.
pub(crate) fn open_store(cfg: &GenConfig) -> Result<Arc<JsonStateStore>> {
    let store = match &cfg.state_path {
        Some(path) => JsonStateStore::at(path),
        None => JsonStateStore::open_default()?,
    };
    tracing::debug!(path = %store.path().display(), "state store");
    Ok(Arc::new(store))
}

/// Wire the production collaborators into a run context.
pub(crate) fn run_context(cfg: &GenConfig, store: Arc<JsonStateStore>) -> RunContext {
    RunContext::new(
        Arc::new(HttpGenerator::from_config(cfg)),
        store,
        Arc::new(TokioPacer),
    )
}

/// End-of-run summary: timing plus every failed task title. Per-task failures
/// are reported here and do not change the process exit code.
pub(crate) fn print_summary(summary: &RunSummary) {
    println!(
        "Run finished in {:.1}s: {} completed, {} failed.",
        summary.elapsed.as_secs_f64(),
        summary.completed,
        summary.failed
    );
    if !summary.failed_titles.is_empty() {
        println!("Failed tasks (use `coursegen retry` to resubmit):");
        for title in &summary.failed_titles {
            println!("  - {title}");
        }
    }
    for w in &summary.workers {
        if w.completed_count + w.error_count > 0 {
            tracing::info!(
                worker_id = w.worker_id,
                completed = w.completed_count,
                errors = w.error_count,
                "worker finished"
            );
        }
    }
}
