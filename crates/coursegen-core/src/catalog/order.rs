//! Priority modes: how the flattened catalog is ordered before scheduling.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::TaskTemplate;

/// Scheduling order for catalog tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// Most-enrolled templates first.
    #[default]
    EnrollmentDesc,
    /// Newest templates first.
    CreationDateDesc,
    /// Title ascending.
    AlphabeticalAsc,
    /// Uniform Fisher-Yates shuffle; deterministic only with an explicit seed.
    Random,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enrollment-desc" => Ok(Priority::EnrollmentDesc),
            "creation-date-desc" => Ok(Priority::CreationDateDesc),
            "alphabetical-asc" => Ok(Priority::AlphabeticalAsc),
            "random" => Ok(Priority::Random),
            other => Err(format!(
                "unknown priority {other:?} (expected enrollment-desc, \
                 creation-date-desc, alphabetical-asc, or random)"
            )),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::EnrollmentDesc => "enrollment-desc",
            Priority::CreationDateDesc => "creation-date-desc",
            Priority::AlphabeticalAsc => "alphabetical-asc",
            Priority::Random => "random",
        };
        f.write_str(s)
    }
}

/// Order the flattened (subject, template) entries in place.
///
/// The sorts are stable, so templates with equal keys keep their curriculum
/// order. Missing enrollment/creation metadata sorts last.
pub(super) fn apply(entries: &mut [(String, TaskTemplate)], priority: Priority, seed: Option<u64>) {
    match priority {
        Priority::EnrollmentDesc => {
            entries.sort_by(|a, b| {
                b.1.enrollment_count
                    .unwrap_or(0)
                    .cmp(&a.1.enrollment_count.unwrap_or(0))
            });
        }
        Priority::CreationDateDesc => {
            entries.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
        }
        Priority::AlphabeticalAsc => {
            entries.sort_by(|a, b| a.1.title.cmp(&b.1.title));
        }
        Priority::Random => {
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            entries.shuffle(&mut rng);
        }
    }
}
