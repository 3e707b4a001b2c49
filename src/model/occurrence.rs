// Occurrences as emitted by the calendar generator, and what they resolve to.
use crate::model::tag::{FastStart, Sanctity};
use serde::{Deserialize, Serialize};

/// One named calendar entry reported for a specific date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawOccurrence {
    pub name: String,
    #[serde(default)]
    pub is_fast: bool,
    #[serde(default)]
    pub is_festival: bool,
}

impl RawOccurrence {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_fast: false,
            is_festival: false,
        }
    }

    pub fn festival(name: &str) -> Self {
        Self {
            is_festival: true,
            ..Self::new(name)
        }
    }

    pub fn fast(name: &str) -> Self {
        Self {
            is_fast: true,
            ..Self::new(name)
        }
    }
}

/// An occurrence that matched a mapping rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEvent {
    pub tag_key: String,
    pub name_hebrew: String,
    pub name_english: String,
    /// 1 for the first day of a multi-day span.
    pub day_number: u32,
    /// Span length in the queried jurisdiction.
    pub total_days: u32,
    pub is_final_day: bool,
    #[serde(default)]
    pub fast_start: FastStart,
    #[serde(default)]
    pub sanctity: Sanctity,
    #[serde(default)]
    pub hidden: bool,
    /// Raw occurrence name; `None` for the weekly rest day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

impl ResolvedEvent {
    pub fn is_festival(&self) -> bool {
        self.sanctity == Sanctity::FullFestival
    }
}
