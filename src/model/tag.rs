// Semantic tags: the canonical labels occurrences resolve to.
use crate::model::jurisdiction::{Jurisdiction, PerJurisdiction};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TagType {
    #[default]
    Event,
    Category,
    Modifier,
    HiddenInternal,
}

/// How holy a day is. Drives eve and night-after behaviour.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sanctity {
    #[default]
    None,
    FullFestival,
    IntermediateDays,
}

/// When the restrictions of a fast begin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FastStart {
    #[default]
    None,
    Dawn,
    Sunset,
}

impl FastStart {
    pub fn is_fast(self) -> bool {
        self != FastStart::None
    }
}

/// Selects the English rendering of tag names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransliterationStyle {
    #[default]
    Sephardi,
    Ashkenazi,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagNames {
    #[serde(default)]
    pub hebrew: String,
    pub ashkenazi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sephardi: Option<String>,
}

impl TagNames {
    pub fn english(&self, style: TransliterationStyle) -> &str {
        match style {
            TransliterationStyle::Sephardi => self.sephardi.as_deref().unwrap_or(&self.ashkenazi),
            TransliterationStyle::Ashkenazi => &self.ashkenazi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Stable identifier. Rules and formulas reference tags by this key.
    pub key: String,
    pub names: TagNames,
    #[serde(default)]
    pub tag_type: TagType,
    /// Hidden tags take part in matching and filtering but are never shown.
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub sanctity: Sanctity,
    #[serde(default)]
    pub fast_start: FastStart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_number: Option<u32>,
    #[serde(default, skip_serializing_if = "PerJurisdiction::is_empty")]
    pub total_days: PerJurisdiction,
    #[serde(default)]
    pub sort_order: i32,
}

impl Tag {
    pub fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            names: TagNames {
                hebrew: String::new(),
                ashkenazi: name.to_string(),
                sephardi: None,
            },
            tag_type: TagType::Event,
            hidden: false,
            sanctity: Sanctity::None,
            fast_start: FastStart::None,
            day_number: None,
            total_days: PerJurisdiction::default(),
            sort_order: 0,
        }
    }

    pub fn with_sanctity(mut self, sanctity: Sanctity) -> Self {
        self.sanctity = sanctity;
        self
    }

    pub fn with_fast_start(mut self, fast_start: FastStart) -> Self {
        self.fast_start = fast_start;
        self
    }

    pub fn with_total_days(mut self, total_days: PerJurisdiction) -> Self {
        self.total_days = total_days;
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn is_festival(&self) -> bool {
        self.sanctity == Sanctity::FullFestival
    }

    /// Configured span length for a jurisdiction, if any.
    pub fn total_days_for(&self, jurisdiction: Jurisdiction) -> Option<u32> {
        self.total_days.get(jurisdiction)
    }
}
