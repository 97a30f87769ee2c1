//! Orchestration strategies over the pending task set.
//!
//! Two configurable policies share one coordinating routine:
//! - static partition ([`run_worker_pool`]): N sequential workers, no shared
//!   queue, per-task cooldown;
//! - bounded batch fan-out ([`run_batches`]): fixed-size concurrent groups
//!   joined per batch, inter-batch delay.
//!
//! The only suspension points are the generator call and the deliberate
//! pacing sleeps. Generation failures never propagate past the one task.

mod batch;
mod coordinator;
mod event;
mod pace;
mod partition;
mod pool;
mod worker;

pub use batch::{run_batches, BatchOptions};
pub use event::{TaskTransition, TransitionKind};
pub use pace::{Pacer, TokioPacer};
pub use partition::{partition_slices, PartitionError};
pub use pool::{run_worker_pool, PoolOptions};
pub use worker::{WorkerState, WorkerStatus};

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::generator::Generator;
use crate::state::ProgressStore;

/// Shared collaborators for one orchestration run.
pub struct RunContext {
    pub generator: Arc<dyn Generator>,
    pub store: Arc<dyn ProgressStore>,
    pub pacer: Arc<dyn Pacer>,
    /// Snapshot `startTime`: run start for a fresh run, the prior run's start
    /// when resuming (so the ETA stays consistent across resumes).
    pub run_start: DateTime<Utc>,
}

impl RunContext {
    pub fn new(
        generator: Arc<dyn Generator>,
        store: Arc<dyn ProgressStore>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            generator,
            store,
            pacer,
            run_start: Utc::now(),
        }
    }

    pub fn with_run_start(mut self, run_start: DateTime<Utc>) -> Self {
        self.run_start = run_start;
        self
    }
}

/// What one run did, for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Tasks completed by this run (prior completions not included).
    pub completed: usize,
    /// Tasks failed by this run.
    pub failed: usize,
    pub failed_titles: Vec<String>,
    pub elapsed: std::time::Duration,
    pub workers: Vec<WorkerStatus>,
}
