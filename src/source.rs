// Boundary to the external Hebrew calendar generator.
use crate::model::{Jurisdiction, RawOccurrence};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Anything that can list the named occurrences of a date.
pub trait CalendarSource: Send + Sync {
    fn occurrences(&self, date: NaiveDate, jurisdiction: Jurisdiction) -> Vec<RawOccurrence>;
}

impl<F> CalendarSource for F
where
    F: Fn(NaiveDate, Jurisdiction) -> Vec<RawOccurrence> + Send + Sync,
{
    fn occurrences(&self, date: NaiveDate, jurisdiction: Jurisdiction) -> Vec<RawOccurrence> {
        self(date, jurisdiction)
    }
}

/// Occurrences of one date. Entries in `all` apply everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DayEntryRepr")]
pub struct DayEntry {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all: Vec<RawOccurrence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub israel: Vec<RawOccurrence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diaspora: Vec<RawOccurrence>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DayEntryRepr {
    List(Vec<RawOccurrence>),
    Split(SplitDay),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SplitDay {
    #[serde(default)]
    all: Vec<RawOccurrence>,
    #[serde(default)]
    israel: Vec<RawOccurrence>,
    #[serde(default)]
    diaspora: Vec<RawOccurrence>,
}

impl From<DayEntryRepr> for DayEntry {
    fn from(repr: DayEntryRepr) -> Self {
        match repr {
            DayEntryRepr::List(all) => Self {
                all,
                ..Self::default()
            },
            DayEntryRepr::Split(SplitDay {
                all,
                israel,
                diaspora,
            }) => Self {
                all,
                israel,
                diaspora,
            },
        }
    }
}

impl DayEntry {
    fn for_jurisdiction(&self, jurisdiction: Jurisdiction) -> impl Iterator<Item = &RawOccurrence> {
        let specific = match jurisdiction {
            Jurisdiction::Israel => &self.israel,
            Jurisdiction::Diaspora => &self.diaspora,
        };
        self.all.iter().chain(specific.iter())
    }
}

/// In-memory calendar, loadable from a JSON file keyed by ISO date:
///
/// ```json
/// {
///   "2025-04-19": [{ "name": "Pesach VII", "is_festival": true }],
///   "2025-04-20": { "diaspora": [{ "name": "Pesach VIII", "is_festival": true }] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCalendar {
    days: BTreeMap<NaiveDate, DayEntry>,
}

impl StaticCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an occurrence reported in every jurisdiction.
    pub fn add(&mut self, date: NaiveDate, occurrence: RawOccurrence) -> &mut Self {
        self.days.entry(date).or_default().all.push(occurrence);
        self
    }

    pub fn add_for(
        &mut self,
        date: NaiveDate,
        jurisdiction: Jurisdiction,
        occurrence: RawOccurrence,
    ) -> &mut Self {
        let entry = self.days.entry(date).or_default();
        match jurisdiction {
            Jurisdiction::Israel => entry.israel.push(occurrence),
            Jurisdiction::Diaspora => entry.diaspora.push(occurrence),
        }
        self
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read calendar '{}'", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Failed to parse calendar '{}'", path.display()))
    }

    /// First and last date with any entry.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = *self.days.keys().next()?;
        let last = *self.days.keys().next_back()?;
        Some((first, last))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl CalendarSource for StaticCalendar {
    fn occurrences(&self, date: NaiveDate, jurisdiction: Jurisdiction) -> Vec<RawOccurrence> {
        self.days
            .get(&date)
            .map(|entry| entry.for_jurisdiction(jurisdiction).cloned().collect())
            .unwrap_or_default()
    }
}
