//! Day classification: what is in effect today, what begins tonight and what
//! ends tonight.
//!
//! The three passes each work from the raw occurrences of the date and the
//! following date. None of them looks at another pass's result, so they can run
//! in any order.
//!
//! The weekly rest day is the single structural exception to "everything comes
//! from the catalog": calendar generators do not report it, so it is derived
//! from the day of the week. Do not move it into the rule table; no occurrence
//! name would ever match.

use crate::model::{FastStart, Jurisdiction, RawOccurrence, ResolvedEvent, TransliterationStyle};
use crate::source::CalendarSource;
use crate::store::CatalogSnapshot;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumIter, EnumString};

pub const WEEKLY_REST_DAY: Weekday = Weekday::Sat;

/// Transitions that need their own presentation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpecialContext {
    /// The rest day runs straight into a festival.
    ShabbosToYomtov,
    /// Second festival day kept only outside Israel.
    YomtovDay2,
    /// A festival day followed by another festival day.
    YomtovToYomtov,
}

/// Raw occurrences for a date and the date after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub today: Vec<RawOccurrence>,
    pub tomorrow: Vec<RawOccurrence>,
}

impl DayWindow {
    pub fn gather(source: &dyn CalendarSource, date: NaiveDate, jurisdiction: Jurisdiction) -> Self {
        let today = source.occurrences(date, jurisdiction);
        let tomorrow = next_day(date)
            .map(|d| source.occurrences(d, jurisdiction))
            .unwrap_or_default();
        Self {
            date,
            today,
            tomorrow,
        }
    }

    pub fn tomorrow_date(&self) -> Option<NaiveDate> {
        next_day(self.date)
    }
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayClassification {
    pub active: Vec<ResolvedEvent>,
    pub eve: Vec<ResolvedEvent>,
    pub night_after: Vec<ResolvedEvent>,
}

/// Everything known about one date, for reports and the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDayInfo {
    pub date: NaiveDate,
    pub weekday: String,
    pub jurisdiction: Jurisdiction,
    pub is_rest_day: bool,
    pub is_festival: bool,
    pub is_fast: bool,
    pub active_events: Vec<ResolvedEvent>,
    pub eve_events: Vec<ResolvedEvent>,
    pub night_after_events: Vec<ResolvedEvent>,
    pub special_contexts: Vec<SpecialContext>,
    pub occurrences: Vec<RawOccurrence>,
}

pub struct DayClassifier<'a> {
    snapshot: &'a CatalogSnapshot,
    jurisdiction: Jurisdiction,
    style: TransliterationStyle,
}

impl<'a> DayClassifier<'a> {
    pub fn new(
        snapshot: &'a CatalogSnapshot,
        jurisdiction: Jurisdiction,
        style: TransliterationStyle,
    ) -> Self {
        Self {
            snapshot,
            jurisdiction,
            style,
        }
    }

    pub fn classify(&self, source: &dyn CalendarSource, date: NaiveDate) -> DayClassification {
        self.classify_window(&DayWindow::gather(source, date, self.jurisdiction))
    }

    pub fn classify_window(&self, window: &DayWindow) -> DayClassification {
        DayClassification {
            active: self.active_pass(window),
            eve: self.eve_pass(window),
            night_after: self.night_after_pass(window),
        }
    }

    pub fn day_info(&self, source: &dyn CalendarSource, date: NaiveDate) -> EventDayInfo {
        let window = DayWindow::gather(source, date, self.jurisdiction);
        let classification = self.classify_window(&window);
        let special_contexts = self.special_contexts(&window);

        let is_festival = classification.active.iter().any(ResolvedEvent::is_festival)
            || window.today.iter().any(|o| o.is_festival);
        let is_fast = classification.active.iter().any(|e| e.fast_start.is_fast())
            || window.today.iter().any(|o| o.is_fast);

        EventDayInfo {
            date,
            weekday: date.format("%A").to_string(),
            jurisdiction: self.jurisdiction,
            is_rest_day: is_rest_day(date),
            is_festival,
            is_fast,
            active_events: classification.active,
            eve_events: classification.eve,
            night_after_events: classification.night_after,
            special_contexts,
            occurrences: window.today,
        }
    }

    /// Today's occurrences, plus the rest day on Saturdays.
    fn active_pass(&self, window: &DayWindow) -> Vec<ResolvedEvent> {
        self.events_on(window.date, &window.today)
    }

    /// Tomorrow's events whose observance starts this evening.
    ///
    /// An event already in effect today is continuing, not starting.
    fn eve_pass(&self, window: &DayWindow) -> Vec<ResolvedEvent> {
        let Some(tomorrow) = window.tomorrow_date() else {
            return Vec::new();
        };
        let today_keys: HashSet<String> = self
            .events_on(window.date, &window.today)
            .into_iter()
            .map(|e| e.tag_key)
            .collect();

        self.events_on(tomorrow, &window.tomorrow)
            .into_iter()
            .filter(|e| {
                e.is_festival()
                    || e.fast_start == FastStart::Sunset
                    || self.snapshot.is_rest_tag(&e.tag_key)
            })
            .filter(|e| !today_keys.contains(&e.tag_key))
            .collect()
    }

    /// Today's final-day events that tomorrow does not carry on.
    fn night_after_pass(&self, window: &DayWindow) -> Vec<ResolvedEvent> {
        let tomorrow_events = window
            .tomorrow_date()
            .map(|d| self.events_on(d, &window.tomorrow))
            .unwrap_or_default();
        let tomorrow_keys: HashSet<&str> =
            tomorrow_events.iter().map(|e| e.tag_key.as_str()).collect();
        let tomorrow_is_holy = tomorrow_events.iter().any(|e| self.is_holy(e))
            || window.tomorrow.iter().any(|o| o.is_festival);

        self.events_on(window.date, &window.today)
            .into_iter()
            .filter(|e| e.is_final_day)
            .filter(|e| {
                let continued = tomorrow_keys.contains(e.tag_key.as_str())
                    || (self.is_holy(e) && tomorrow_is_holy);
                !continued
            })
            .collect()
    }

    /// Special contexts, computed from the raw window like the passes.
    pub fn special_contexts(&self, window: &DayWindow) -> Vec<SpecialContext> {
        let mut contexts = Vec::new();
        let today = self.resolve_all(&window.today);
        let tomorrow = self.resolve_all(&window.tomorrow);

        let festival_today =
            today.iter().any(ResolvedEvent::is_festival) || window.today.iter().any(|o| o.is_festival);
        let festival_tomorrow = tomorrow.iter().any(ResolvedEvent::is_festival)
            || window.tomorrow.iter().any(|o| o.is_festival);

        if is_rest_day(window.date) && festival_tomorrow {
            contexts.push(SpecialContext::ShabbosToYomtov);
        }
        if self.jurisdiction == Jurisdiction::Diaspora
            && today.iter().any(|e| self.is_second_festival_day(e))
        {
            contexts.push(SpecialContext::YomtovDay2);
        }
        if festival_today && festival_tomorrow {
            contexts.push(SpecialContext::YomtovToYomtov);
        }
        contexts
    }

    /// A festival day that exists only because the diaspora keeps the
    /// festival one day longer.
    fn is_second_festival_day(&self, event: &ResolvedEvent) -> bool {
        if !event.is_festival() {
            return false;
        }
        let Some(tag) = self.snapshot.registry.get(&event.tag_key) else {
            return false;
        };
        let israel = tag.total_days_for(Jurisdiction::Israel).unwrap_or(1);
        let diaspora = tag.total_days_for(Jurisdiction::Diaspora).unwrap_or(1);
        israel < diaspora && (event.day_number == 2 || event.day_number == event.total_days)
    }

    fn is_holy(&self, event: &ResolvedEvent) -> bool {
        event.is_festival() || self.snapshot.is_rest_tag(&event.tag_key)
    }

    fn events_on(&self, date: NaiveDate, occurrences: &[RawOccurrence]) -> Vec<ResolvedEvent> {
        let mut events = self.resolve_all(occurrences);
        if is_rest_day(date)
            && !events.iter().any(|e| self.snapshot.is_rest_tag(&e.tag_key))
            && let Some(rest) = self.snapshot.rest_day_event(self.style)
        {
            events.insert(0, rest);
        }
        events
    }

    /// Resolves every occurrence, dropping unmapped names and repeated tags.
    fn resolve_all(&self, occurrences: &[RawOccurrence]) -> Vec<ResolvedEvent> {
        let mut seen = HashSet::new();
        occurrences
            .iter()
            .filter_map(|o| {
                self.snapshot
                    .resolve_event(&o.name, self.jurisdiction, self.style)
            })
            .filter(|e| seen.insert(e.tag_key.clone()))
            .collect()
    }
}

pub fn is_rest_day(date: NaiveDate) -> bool {
    date.weekday() == WEEKLY_REST_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::source::StaticCalendar;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::build(Catalog::builtin().unwrap(), "shabbos").unwrap()
    }

    fn keys(events: &[ResolvedEvent]) -> Vec<&str> {
        events.iter().map(|e| e.tag_key.as_str()).collect()
    }

    #[test]
    fn plain_weekday_is_empty() {
        let snap = snapshot();
        let classifier =
            DayClassifier::new(&snap, Jurisdiction::Diaspora, TransliterationStyle::default());
        // Tuesday
        let result = classifier.classify(&StaticCalendar::new(), date("2025-01-07"));
        assert_eq!(result, DayClassification::default());
    }

    #[test]
    fn friday_is_eve_and_saturday_ends_rest_day() {
        let snap = snapshot();
        let classifier =
            DayClassifier::new(&snap, Jurisdiction::Diaspora, TransliterationStyle::default());
        let cal = StaticCalendar::new();

        let friday = classifier.classify(&cal, date("2025-01-10"));
        assert!(friday.active.is_empty());
        assert_eq!(keys(&friday.eve), vec!["shabbos"]);

        let saturday = classifier.classify(&cal, date("2025-01-11"));
        assert_eq!(keys(&saturday.active), vec!["shabbos"]);
        assert_eq!(keys(&saturday.night_after), vec!["shabbos"]);
        assert!(saturday.eve.is_empty());
    }

    #[test]
    fn festival_continuation_is_not_an_eve() {
        let snap = snapshot();
        let classifier =
            DayClassifier::new(&snap, Jurisdiction::Diaspora, TransliterationStyle::default());
        let mut cal = StaticCalendar::new();
        // Monday and Tuesday
        cal.add(date("2025-06-02"), RawOccurrence::festival("Shavuot I"))
            .add(date("2025-06-03"), RawOccurrence::festival("Shavuot II"));

        let day1 = classifier.classify(&cal, date("2025-06-02"));
        assert_eq!(keys(&day1.active), vec!["shavuos"]);
        assert!(day1.eve.is_empty());
        assert!(day1.night_after.is_empty());

        let info = classifier.day_info(&cal, date("2025-06-02"));
        assert_eq!(info.special_contexts, vec![SpecialContext::YomtovToYomtov]);

        let day2 = classifier.classify(&cal, date("2025-06-03"));
        assert_eq!(keys(&day2.night_after), vec!["shavuos"]);
        let info = classifier.day_info(&cal, date("2025-06-03"));
        assert_eq!(info.special_contexts, vec![SpecialContext::YomtovDay2]);
    }

    #[test]
    fn rest_day_into_festival() {
        let snap = snapshot();
        let classifier =
            DayClassifier::new(&snap, Jurisdiction::Diaspora, TransliterationStyle::default());
        let mut cal = StaticCalendar::new();
        // Saturday 2025-04-12, Pesach I on Sunday.
        cal.add(date("2025-04-13"), RawOccurrence::festival("Pesach I"));

        let result = classifier.classify(&cal, date("2025-04-12"));
        assert_eq!(keys(&result.active), vec!["shabbos"]);
        assert_eq!(keys(&result.eve), vec!["pesach"]);
        assert!(result.night_after.is_empty());

        let info = classifier.day_info(&cal, date("2025-04-12"));
        assert!(info.is_rest_day);
        assert!(info.special_contexts.contains(&SpecialContext::ShabbosToYomtov));
    }

    #[test]
    fn fasts_by_start_time() {
        let snap = snapshot();
        let classifier =
            DayClassifier::new(&snap, Jurisdiction::Diaspora, TransliterationStyle::default());
        let mut cal = StaticCalendar::new();
        cal.add(date("2025-08-03"), RawOccurrence::fast("Tish'a B'Av"))
            .add(date("2025-07-13"), RawOccurrence::fast("Tzom Tammuz"));

        let erev = classifier.classify(&cal, date("2025-08-02"));
        assert!(keys(&erev.eve).contains(&"tisha_bav"));

        let erev_dawn_fast = classifier.classify(&cal, date("2025-07-12"));
        assert!(!keys(&erev_dawn_fast.eve).contains(&"shiva_asar_btamuz"));

        let fast = classifier.day_info(&cal, date("2025-07-13"));
        assert!(fast.is_fast);
        assert_eq!(keys(&fast.night_after_events), vec!["shiva_asar_btamuz"]);
    }

    #[test]
    fn passes_do_not_depend_on_each_other() {
        let snap = snapshot();
        let classifier =
            DayClassifier::new(&snap, Jurisdiction::Israel, TransliterationStyle::default());
        let window = DayWindow {
            date: date("2025-04-16"),
            today: vec![RawOccurrence::new("Pesach VI (CH''M)")],
            tomorrow: vec![RawOccurrence::festival("Pesach VII")],
        };
        let a = classifier.classify_window(&window);
        let b = DayClassification {
            night_after: classifier.night_after_pass(&window),
            eve: classifier.eve_pass(&window),
            active: classifier.active_pass(&window),
        };
        assert_eq!(a, b);
        assert_eq!(keys(&a.active), vec!["chol_hamoed_pesach"]);
        assert_eq!(keys(&a.eve), vec!["pesach"]);
        assert_eq!(keys(&a.night_after), vec!["chol_hamoed_pesach"]);
    }
}
