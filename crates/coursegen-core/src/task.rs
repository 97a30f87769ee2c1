//! Task model: one unit of generation work with a tracked status lifecycle.
//!
//! A task describes one artifact (a course or a book) to generate. Identity is
//! the (subject, title) pair; that key is what resume uses to dedupe and carry
//! prior statuses forward. Serde field names match the persisted JSON state
//! file, which originates from an earlier JavaScript implementation (camelCase
//! keys, kebab-case statuses, ISO-8601 timestamps).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of one task.
///
/// Transitions are strictly pending → in-progress → {completed | failed}.
/// Completed and failed are terminal; only an explicit retry moves a failed
/// task back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Identity of a task: the (subject, title) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub subject: String,
    pub title: String,
}

impl std::fmt::Display for TaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.subject, self.title)
    }
}

/// The slice of a task handed to the generation service: everything it needs
/// to produce one artifact, nothing about orchestration state.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub title: String,
    pub subject: String,
    pub level: String,
    pub sections: Vec<String>,
}

/// One unit of generation work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub subject: String,
    pub title: String,
    pub level: String,
    /// Ordered section titles the generated artifact must cover.
    pub sections: Vec<String>,
    pub status: TaskStatus,
    /// Identifier of the generated artifact, set on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    /// Message of the generation failure, set when the task fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a fresh pending task.
    pub fn new(
        subject: impl Into<String>,
        title: impl Into<String>,
        level: impl Into<String>,
        sections: Vec<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            title: title.into(),
            level: level.into(),
            sections,
            status: TaskStatus::Pending,
            artifact_id: None,
            error: None,
            start_time: None,
            end_time: None,
        }
    }

    pub fn key(&self) -> TaskKey {
        TaskKey {
            subject: self.subject.clone(),
            title: self.title.clone(),
        }
    }

    /// Stable string identity, used for `completedTaskIds` in the snapshot.
    pub fn id(&self) -> String {
        format!("{}/{}", self.subject, self.title)
    }

    pub fn spec(&self) -> TaskSpec {
        TaskSpec {
            title: self.title.clone(),
            subject: self.subject.clone(),
            level: self.level.clone(),
            sections: self.sections.clone(),
        }
    }

    /// Mark the task in-progress.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::InProgress;
        self.start_time = Some(now);
        self.end_time = None;
    }

    /// Mark the task completed, recording the generated artifact.
    pub fn complete(&mut self, artifact_id: impl Into<String>, now: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.artifact_id = Some(artifact_id.into());
        self.error = None;
        self.end_time = Some(now);
    }

    /// Mark the task failed, recording the error message.
    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.end_time = Some(now);
    }

    /// Put the task back in the pending set, clearing error and timestamps.
    /// This is the only way out of a terminal or orphaned in-progress state.
    pub fn reset_to_pending(&mut self) {
        self.status = TaskStatus::Pending;
        self.error = None;
        self.start_time = None;
        self.end_time = None;
    }
}
