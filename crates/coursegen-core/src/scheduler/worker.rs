//! Per-worker status tracking for monitoring and the end-of-run summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a worker (or batch slot) is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerState {
    Idle,
    Processing,
    /// Last task errored; the worker keeps going with its next task.
    Error,
}

/// Status of one long-lived worker, maintained by the coordinator from the
/// transitions the worker reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub worker_id: usize,
    pub status: WorkerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    pub completed_count: usize,
    pub error_count: usize,
    pub start_time: DateTime<Utc>,
}

impl WorkerStatus {
    pub fn new(worker_id: usize, start_time: DateTime<Utc>) -> Self {
        Self {
            worker_id,
            status: WorkerState::Idle,
            current_task: None,
            completed_count: 0,
            error_count: 0,
            start_time,
        }
    }
}
