//! Resume semantics: merge a freshly enumerated catalog with prior state.
//!
//! Identity is the (subject, title) pair. Tasks completed in a prior run stay
//! completed and are excluded from the new pending set; failed tasks keep
//! their failure (retry is a separate, explicit operation). Tasks left
//! in-progress by a crashed run are requeued to pending, since no generator
//! call survives a process exit.

use std::collections::{HashMap, HashSet};

use crate::task::{Task, TaskKey, TaskStatus};

/// Requeue tasks orphaned in-progress by a previous process. Returns how many
/// were reset.
pub fn requeue_stale(tasks: &mut [Task]) -> usize {
    let mut requeued = 0;
    for task in tasks.iter_mut() {
        if task.status == TaskStatus::InProgress {
            tracing::warn!(
                subject = %task.subject,
                title = %task.title,
                "task was in-progress in prior state; requeueing as pending"
            );
            task.reset_to_pending();
            requeued += 1;
        }
    }
    requeued
}

/// Merge a freshly enumerated task list with prior persisted tasks.
///
/// The result follows the catalog's order, carrying prior status, artifact,
/// error, and timestamps forward by identity. Catalog duplicates are dropped
/// (first occurrence wins). Prior tasks no longer present in the catalog are
/// retained at the end so completed history is not lost. Stale in-progress
/// entries are requeued. Merging is idempotent: merging the output with the
/// same catalog again yields an identical list.
pub fn merge_prior(catalog_tasks: Vec<Task>, prior: Vec<Task>) -> Vec<Task> {
    let mut prior_by_key: HashMap<TaskKey, Task> =
        prior.into_iter().map(|t| (t.key(), t)).collect();

    let mut merged = Vec::new();
    let mut seen: HashSet<TaskKey> = HashSet::new();
    for fresh in catalog_tasks {
        let key = fresh.key();
        if !seen.insert(key.clone()) {
            tracing::debug!(task = %key, "duplicate catalog entry dropped");
            continue;
        }
        match prior_by_key.remove(&key) {
            Some(prev) => {
                // Catalog is the source of truth for content; prior state is
                // the source of truth for lifecycle.
                let mut task = fresh;
                task.status = prev.status;
                task.artifact_id = prev.artifact_id;
                task.error = prev.error;
                task.start_time = prev.start_time;
                task.end_time = prev.end_time;
                merged.push(task);
            }
            None => merged.push(fresh),
        }
    }

    // Prior-only tasks, in their original order.
    let mut leftovers: Vec<Task> = prior_by_key.into_values().collect();
    leftovers.sort_by(|a, b| a.id().cmp(&b.id()));
    merged.extend(leftovers);

    requeue_stale(&mut merged);
    merged
}
