use crate::model::jurisdiction::PerJurisdiction;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchKind {
    /// Literal, whole-name comparison.
    #[default]
    Exact,
    /// Regular expression, anchored at the start of the name.
    Pattern,
}

/// Binds one occurrence-name pattern to exactly one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    pub tag: String,
    #[serde(default)]
    pub kind: MatchKind,
    pub pattern: String,
    #[serde(default)]
    pub priority: i32,
    /// Fixed day within the tag's span, for names that carry no numeral.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_number: Option<u32>,
    /// Replaces the tag's span length for names matched by this rule.
    #[serde(default, skip_serializing_if = "PerJurisdiction::is_empty")]
    pub total_days: PerJurisdiction,
    /// Subtracted from the day numeral found in the name, for tags that cover
    /// part of a longer festival whose names count from the festival's start.
    #[serde(default, skip_serializing_if = "PerJurisdiction::is_empty")]
    pub numeral_offset: PerJurisdiction,
}

impl MappingRule {
    pub fn exact(tag: &str, pattern: &str) -> Self {
        Self {
            tag: tag.to_string(),
            kind: MatchKind::Exact,
            pattern: pattern.to_string(),
            priority: 0,
            day_number: None,
            total_days: PerJurisdiction::default(),
            numeral_offset: PerJurisdiction::default(),
        }
    }

    pub fn pattern(tag: &str, pattern: &str, priority: i32) -> Self {
        Self {
            kind: MatchKind::Pattern,
            priority,
            ..Self::exact(tag, pattern)
        }
    }

    pub fn with_day_number(mut self, day_number: u32) -> Self {
        self.day_number = Some(day_number);
        self
    }

    pub fn with_total_days(mut self, total_days: PerJurisdiction) -> Self {
        self.total_days = total_days;
        self
    }

    pub fn with_numeral_offset(mut self, offset: PerJurisdiction) -> Self {
        self.numeral_offset = offset;
        self
    }

    /// Persisted identity of a rule.
    pub fn identity(&self) -> (&str, MatchKind) {
        (&self.pattern, self.kind)
    }
}
