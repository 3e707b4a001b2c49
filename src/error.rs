//! Configuration errors for the tag catalog.
//!
//! These are only ever produced while loading, editing or reloading a catalog.
//! Classifying a date never fails.

use crate::model::{MatchKind, TagType};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Tag with empty key (display name '{0}')")]
    EmptyTagKey(String),

    #[error("Duplicate tag key: {0}")]
    DuplicateTag(String),

    #[error("Rule '{pattern}' references unknown tag '{tag}'")]
    UnknownTag { pattern: String, tag: String },

    #[error("Duplicate {kind} pattern: '{pattern}'")]
    DuplicatePattern { kind: MatchKind, pattern: String },

    #[error("Invalid pattern '{pattern}' for tag '{tag}': {source}")]
    InvalidPattern {
        tag: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Tag '{tag}': day number {day_number} exceeds total days {total_days}")]
    DayNumberExceedsTotal {
        tag: String,
        day_number: u32,
        total_days: u32,
    },

    #[error("Tag '{0}': day numbers start at 1")]
    ZeroDayNumber(String),

    #[error("Tag '{0}': total days must be at least 1")]
    ZeroTotalDays(String),

    #[error("Tag '{tag}': fast start timing is only allowed on event tags, not {tag_type}")]
    FastTimingOnNonEvent { tag: String, tag_type: TagType },

    #[error("Tag '{tag}' is still referenced by {rules} rule(s)")]
    TagInUse { tag: String, rules: usize },

    #[error("No {kind} rule with pattern '{pattern}'")]
    UnknownRule { kind: MatchKind, pattern: String },

    #[error("Weekly rest tag '{0}' is not in the catalog")]
    UnknownRestTag(String),

    #[error("{} catalog problems:\n{}", .0.len(), render_list(.0))]
    Multiple(Vec<CatalogError>),
}

fn render_list(errors: &[CatalogError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl CatalogError {
    /// Collapses a list of problems into a single error, or `Ok` when empty.
    pub fn from_list(mut errors: Vec<CatalogError>) -> Result<(), CatalogError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(CatalogError::Multiple(errors)),
        }
    }

    /// Flattened, owned list of every problem.
    pub fn into_problems(self) -> Vec<CatalogError> {
        match self {
            CatalogError::Multiple(list) => list,
            other => vec![other],
        }
    }

    /// Flattened view, so callers can inspect every problem uniformly.
    pub fn problems(&self) -> Vec<&CatalogError> {
        match self {
            CatalogError::Multiple(list) => list.iter().collect(),
            other => vec![other],
        }
    }
}
