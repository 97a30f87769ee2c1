//! `coursegen report` – read-only aggregation of persisted results.

use anyhow::{anyhow, Result};

use coursegen_core::config::GenConfig;
use coursegen_core::report::{self, Tally};
use coursegen_core::state::ProgressStore;

use super::open_store;

pub fn run_report(cfg: &GenConfig) -> Result<()> {
    let store = open_store(cfg)?;
    let mut state = store
        .load()?
        .ok_or_else(|| anyhow!("no persisted run to report on"))?;
    state.reconcile();

    let report = report::aggregate(&state.tasks);

    println!("By subject:");
    print_tallies(report.by_subject.iter());
    println!();
    println!("By level:");
    print_tallies(report.by_level.iter());

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
    if !p.failed_task_titles.is_empty() {
        println!("Failed tasks:");
        for title in &p.failed_task_titles {
            println!("  - {title}");
        }
    }
    Ok(())
}

fn print_tallies<'a>(groups: impl Iterator<Item = (&'a String, &'a Tally)>) {
    println!("  {:<28} {:>6} {:>10} {:>7}", "GROUP", "TOTAL", "COMPLETED", "FAILED");
    for (name, tally) in groups {
        println!(
            "  {:<28} {:>6} {:>10} {:>7}",
            name, tally.total, tally.completed, tally.failed
        );
    }
}
