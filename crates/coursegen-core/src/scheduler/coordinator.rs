//! The coordinating routine that owns the task list for one run.
//!
//! Exactly one coordinator exists per process. It applies transitions
//! reported by workers, recomputes the progress snapshot on every one, and
//! persists through the injected store. Persistence failures mid-run are
//! logged and the run continues.

use chrono::{DateTime, Utc};

use super::event::{TaskTransition, TransitionKind};
use super::worker::{WorkerState, WorkerStatus};
use super::RunSummary;
use crate::state::{PersistedState, ProgressSnapshot, ProgressStore};
use crate::task::{Task, TaskKey};

pub(super) struct Coordinator<'a> {
    tasks: &'a mut Vec<Task>,
    store: &'a dyn ProgressStore,
    run_start: DateTime<Utc>,
    workers: Vec<WorkerStatus>,
    current_task: Option<String>,
    completed_this_run: usize,
    failed_titles: Vec<String>,
}

impl<'a> Coordinator<'a> {
    pub(super) fn new(
        tasks: &'a mut Vec<Task>,
        store: &'a dyn ProgressStore,
        run_start: DateTime<Utc>,
        worker_count: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            tasks,
            store,
            run_start,
            workers: (0..worker_count)
                .map(|id| WorkerStatus::new(id, now))
                .collect(),
            current_task: None,
            completed_this_run: 0,
            failed_titles: Vec::new(),
        }
    }

    /// Apply one reported transition, then persist a fresh snapshot.
    pub(super) fn apply(&mut self, transition: TaskTransition) {
        let now = Utc::now();
        let TaskTransition {
            worker_id,
            key,
            kind,
        } = transition;

        {
            let Some(task) = self.task_mut(&key) else {
                tracing::warn!(task = %key, "transition for unknown task ignored");
                return;
            };
            match &kind {
                TransitionKind::Started => task.start(now),
                TransitionKind::Completed { artifact_id } => {
                    task.complete(artifact_id.clone(), now)
                }
                TransitionKind::Failed { error } => task.fail(error.clone(), now),
            }
        }

        match kind {
            TransitionKind::Started => {
                tracing::info!(worker_id, task = %key, "generation started");
                self.current_task = Some(key.title.clone());
                if let Some(w) = self.workers.get_mut(worker_id) {
                    w.status = WorkerState::Processing;
                    w.current_task = Some(key.title.clone());
                }
            }
            TransitionKind::Completed { artifact_id } => {
                tracing::info!(worker_id, task = %key, %artifact_id, "generation completed");
                self.completed_this_run += 1;
                if self.current_task.as_deref() == Some(key.title.as_str()) {
                    self.current_task = None;
                }
                if let Some(w) = self.workers.get_mut(worker_id) {
                    w.status = WorkerState::Idle;
                    w.current_task = None;
                    w.completed_count += 1;
                }
            }
            TransitionKind::Failed { error } => {
                tracing::warn!(worker_id, task = %key, %error, "generation failed");
                self.failed_titles.push(key.title.clone());
                if self.current_task.as_deref() == Some(key.title.as_str()) {
                    self.current_task = None;
                }
                if let Some(w) = self.workers.get_mut(worker_id) {
                    w.status = WorkerState::Error;
                    w.current_task = None;
                    w.error_count += 1;
                }
            }
        }

        self.persist(now);
    }

    /// Write the current snapshot. Best-effort: a failed save is logged, not
    /// propagated, so a full disk never kills an hour-long run.
    pub(super) fn persist(&mut self, now: DateTime<Utc>) {
        let progress = ProgressSnapshot::recompute(
            self.tasks,
            self.run_start,
            now,
            self.current_task.clone(),
        );
        let state = PersistedState {
            tasks: self.tasks.clone(),
            progress,
        };
        if let Err(e) = self.store.save(&state) {
            tracing::warn!(error = %e, "progress save failed; continuing with in-memory state");
        }
    }

    pub(super) fn finish(self, elapsed: std::time::Duration) -> RunSummary {
        RunSummary {
            completed: self.completed_this_run,
            failed: self.failed_titles.len(),
            failed_titles: self.failed_titles,
            elapsed,
            workers: self.workers,
        }
    }

    fn task_mut(&mut self, key: &TaskKey) -> Option<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.subject == key.subject && t.title == key.title)
    }
}
