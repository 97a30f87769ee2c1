//! Persisted run state: the task list plus an aggregate progress snapshot.
//!
//! [`ProgressStore`] is an injected port so the engine never touches the disk
//! directly: production uses the JSON-file [`JsonStateStore`], tests use the
//! in-memory [`MemoryStateStore`]. Exactly one coordinating routine per
//! process writes through the store; workers report transitions over a
//! channel instead. Nothing guards against two processes sharing a state
//! path, so operators must not run two orchestrators against the same file.

pub mod resume;

mod json;
mod memory;
mod snapshot;

pub use json::JsonStateStore;
pub use memory::MemoryStateStore;
pub use snapshot::ProgressSnapshot;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::task::Task;

/// Errors reading or writing persisted state.
///
/// Write failures during a run are logged and the run continues (best-effort
/// persistence); load failures are fatal for `resume`/`retry`/`report`, which
/// have nothing to work with without prior state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cannot resolve state directory: {0}")]
    StateDir(String),
    #[error("read state {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("write state {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("state file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("serialize state: {0}")]
    Serialize(serde_json::Error),
}

/// Everything one run persists: the full task list and the latest snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub tasks: Vec<Task>,
    pub progress: ProgressSnapshot,
}

impl PersistedState {
    /// Re-derive the aggregate counts from the task list. If the stored
    /// snapshot disagrees, the recount wins and the discrepancy is logged.
    pub fn reconcile(&mut self) {
        let recount = ProgressSnapshot::recompute(
            &self.tasks,
            self.progress.start_time,
            self.progress.last_update_time,
            self.progress.current_task.clone(),
        );
        if !self.progress.counts_match(&recount) {
            tracing::warn!(
                stored_completed = self.progress.completed_tasks,
                recounted_completed = recount.completed_tasks,
                stored_failed = self.progress.failed_tasks,
                recounted_failed = recount.failed_tasks,
                "stored snapshot disagrees with task list; using recount"
            );
            let estimated = self.progress.estimated_completion;
            self.progress = recount;
            self.progress.estimated_completion = estimated;
        }
    }
}

/// Port over persisted run state. `load` returns `None` when no prior state
/// exists at all (a fresh start).
pub trait ProgressStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError>;
    fn save(&self, state: &PersistedState) -> Result<(), PersistenceError>;
}
