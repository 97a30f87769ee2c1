//! Aggregate progress snapshot: counts, timing, and a naive ETA.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskStatus};

/// Periodically persisted summary of one run, recomputed from the task list
/// on every transition. Field names match the persisted JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub in_progress_tasks: usize,
    pub start_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
    /// Identities of completed tasks; no duplicates, always a subset of the
    /// tasks marked completed.
    pub completed_task_ids: Vec<String>,
    pub failed_task_titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
}

impl ProgressSnapshot {
    /// Recompute every aggregate from the task list.
    ///
    /// The ETA extrapolates linearly from the completion rate so far:
    /// `now + (elapsed / rate - elapsed)`, and is only produced once at least
    /// one task has completed.
    pub fn recompute(
        tasks: &[Task],
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
        current_task: Option<String>,
    ) -> Self {
        let total_tasks = tasks.len();
        let completed: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .collect();
        let failed: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .collect();
        let in_progress_tasks = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count();

        let estimated_completion = if !completed.is_empty() && total_tasks > 0 {
            let elapsed_ms = (now - start_time).num_milliseconds().max(0) as f64;
            let rate = completed.len() as f64 / total_tasks as f64;
            let remaining_ms = elapsed_ms / rate - elapsed_ms;
            Some(now + Duration::milliseconds(remaining_ms as i64))
        } else {
            None
        };

        Self {
            total_tasks,
            completed_tasks: completed.len(),
            failed_tasks: failed.len(),
            in_progress_tasks,
            start_time,
            last_update_time: now,
            completed_task_ids: completed.iter().map(|t| t.id()).collect(),
            failed_task_titles: failed.iter().map(|t| t.title.clone()).collect(),
            current_task,
            estimated_completion,
        }
    }

    /// Tasks not yet started, derived from the other counts.
    pub fn pending_tasks(&self) -> usize {
        self.total_tasks
            .saturating_sub(self.completed_tasks)
            .saturating_sub(self.failed_tasks)
            .saturating_sub(self.in_progress_tasks)
    }

    /// True when every task has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.completed_tasks + self.failed_tasks == self.total_tasks
    }

    pub(crate) fn counts_match(&self, other: &ProgressSnapshot) -> bool {
        self.total_tasks == other.total_tasks
            && self.completed_tasks == other.completed_tasks
            && self.failed_tasks == other.failed_tasks
            && self.in_progress_tasks == other.in_progress_tasks
            && self.completed_task_ids == other.completed_task_ids
            && self.failed_task_titles == other.failed_task_titles
    }
}
