//! Task catalog: turn a curriculum document into an ordered, filtered task list.
//!
//! The curriculum is a nested category → templates structure loaded from JSON.
//! Filtering is intersection (subject AND level when both filters are given);
//! ordering is one of the [`Priority`] modes.

mod order;

pub use order::Priority;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::task::Task;

/// Errors building the task catalog. All of these abort a run before any
/// task is scheduled.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read curriculum {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("curriculum is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("curriculum has no categories")]
    Empty,
    #[error("category #{index} has an empty subject name")]
    UnnamedCategory { index: usize },
    #[error("category {subject:?}: template #{index} has an empty title")]
    UntitledTemplate { subject: String, index: usize },
    #[error("category {subject:?}: template {title:?} has no sections")]
    NoSections { subject: String, title: String },
    #[error("unknown category {0:?}")]
    UnknownCategory(String),
}

/// One generation template inside a category. `enrollment_count` and
/// `created_at` are ordering metadata supplied by the source; they are not
/// carried into the Task itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub title: String,
    pub level: String,
    pub sections: Vec<String>,
    #[serde(default)]
    pub enrollment_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A subject area and its templates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub subject: String,
    pub templates: Vec<TaskTemplate>,
}

/// The nested category → templates source document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    pub categories: Vec<Category>,
}

/// Optional subject/level filters. A task passes only if its subject is in
/// `subjects` and its level is in `levels`, when those are supplied.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub subjects: Option<Vec<String>>,
    pub levels: Option<Vec<String>>,
}

impl CatalogFilter {
    pub fn by_subject(name: impl Into<String>) -> Self {
        Self {
            subjects: Some(vec![name.into()]),
            levels: None,
        }
    }

    pub fn by_level(level: impl Into<String>) -> Self {
        Self {
            subjects: None,
            levels: Some(vec![level.into()]),
        }
    }
}

/// Load and validate a curriculum document from disk.
pub fn load_curriculum(path: &Path) -> Result<Curriculum, CatalogError> {
    let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_curriculum(&data)
}

/// Parse and validate a curriculum document from a JSON string.
pub fn parse_curriculum(data: &str) -> Result<Curriculum, CatalogError> {
    let curriculum: Curriculum = serde_json::from_str(data)?;
    validate(&curriculum)?;
    Ok(curriculum)
}

fn validate(curriculum: &Curriculum) -> Result<(), CatalogError> {
    if curriculum.categories.is_empty() {
        return Err(CatalogError::Empty);
    }
    for (ci, category) in curriculum.categories.iter().enumerate() {
        if category.subject.trim().is_empty() {
            return Err(CatalogError::UnnamedCategory { index: ci });
        }
        for (ti, template) in category.templates.iter().enumerate() {
            if template.title.trim().is_empty() {
                return Err(CatalogError::UntitledTemplate {
                    subject: category.subject.clone(),
                    index: ti,
                });
            }
            if template.sections.is_empty() {
                return Err(CatalogError::NoSections {
                    subject: category.subject.clone(),
                    title: template.title.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Flatten, filter, and order the curriculum into a task list.
///
/// A subject filter naming a category absent from the curriculum is an error
/// (the operator asked for something that does not exist); an empty result
/// after a valid filter is left to the scheduler to reject.
///
/// `seed` only affects [`Priority::Random`]; pass None for an entropy-seeded
/// shuffle.
pub fn build_tasks(
    curriculum: &Curriculum,
    filter: &CatalogFilter,
    priority: Priority,
    seed: Option<u64>,
) -> Result<Vec<Task>, CatalogError> {
    if let Some(subjects) = &filter.subjects {
        let known: HashSet<&str> = curriculum
            .categories
            .iter()
            .map(|c| c.subject.as_str())
            .collect();
        for subject in subjects {
            if !known.contains(subject.as_str()) {
                return Err(CatalogError::UnknownCategory(subject.clone()));
            }
        }
    }

    let mut entries: Vec<(String, TaskTemplate)> = Vec::new();
    for category in &curriculum.categories {
        if let Some(subjects) = &filter.subjects {
            if !subjects.contains(&category.subject) {
                continue;
            }
        }
        for template in &category.templates {
            if let Some(levels) = &filter.levels {
                if !levels.contains(&template.level) {
                    continue;
                }
            }
            entries.push((category.subject.clone(), template.clone()));
        }
    }

    order::apply(&mut entries, priority, seed);

    Ok(entries
        .into_iter()
        .map(|(subject, t)| Task::new(subject, t.title, t.level, t.sections))
        .collect())
}
