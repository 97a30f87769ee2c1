//! Read-only projections over the persisted task list.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::task::{Task, TaskStatus};

/// Per-group tally of generation outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

impl Tally {
    fn count(&mut self, status: TaskStatus) {
        self.total += 1;
        match status {
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Pending | TaskStatus::InProgress => {}
        }
    }
}

/// Aggregated view of a run, grouped by subject and by level.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub by_subject: BTreeMap<String, Tally>,
    pub by_level: BTreeMap<String, Tally>,
}

/// Aggregate the task list. Pure projection: nothing here mutates or
/// persists anything.
pub fn aggregate(tasks: &[Task]) -> GenerationReport {
    let mut by_subject: BTreeMap<String, Tally> = BTreeMap::new();
    let mut by_level: BTreeMap<String, Tally> = BTreeMap::new();
    for task in tasks {
        by_subject
            .entry(task.subject.clone())
            .or_default()
            .count(task.status);
        by_level
            .entry(task.level.clone())
            .or_default()
            .count(task.status);
    }
    GenerationReport {
        by_subject,
        by_level,
    }
}
