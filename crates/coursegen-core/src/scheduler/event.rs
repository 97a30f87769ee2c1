//! Transition messages workers send to the coordinating routine.
//!
//! Workers never mutate the shared task list or write the state file; they
//! report transitions over an mpsc channel and the coordinator applies them.

use crate::task::TaskKey;

#[derive(Debug, Clone)]
pub enum TransitionKind {
    /// The worker is about to invoke the generator for this task.
    Started,
    /// Generation succeeded with the given artifact id.
    Completed { artifact_id: String },
    /// Generation failed; the task is marked failed with this message.
    Failed { error: String },
}

/// One task transition, attributed to the worker (or batch slot) that drove it.
#[derive(Debug, Clone)]
pub struct TaskTransition {
    pub worker_id: usize,
    pub key: TaskKey,
    pub kind: TransitionKind,
}
