//! `coursegen status` – list persisted tasks and the overall progress.

use anyhow::Result;

use coursegen_core::config::GenConfig;
use coursegen_core::state::ProgressStore;

use super::open_store;

pub fn run_status(cfg: &GenConfig) -> Result<()> {
    let store = open_store(cfg)?;
    let Some(mut state) = store.load()? else {
        println!("No persisted run.");
        return Ok(());
    };
    state.reconcile();

    println!(
        "{:<16} {:<36} {:<14} {:<12} {}",
        "SUBJECT", "TITLE", "LEVEL", "STATUS", "DETAIL"
    );
    for task in &state.tasks {
        let detail = task
            .artifact_id
            .as_deref()
            .or(task.error.as_deref())
            .unwrap_or("-");
        println!(
            "{:<16} {:<36} {:<14} {:<12} {}",
            task.subject, task.title, task.level, task.status, detail
        );
    }

    let p = &state.progress;
    println!();
    println!(
        "{} tasks: {} completed, {} failed, {} in progress, {} pending",
        p.total_tasks,
        p.completed_tasks,
        p.failed_tasks,
        p.in_progress_tasks,
        p.pending_tasks()
    );
    if let Some(current) = &p.current_task {
        println!("Last active task: {current}");
    }
    if let Some(eta) = p.estimated_completion {
        println!("Estimated completion: {}", eta.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}
