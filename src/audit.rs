// Mapping coverage over a range of dates.
//
// Shows which generator names the catalog does not recognise yet, and which
// tags no name ever reaches.
use crate::model::{Jurisdiction, TransliterationStyle};
use crate::source::CalendarSource;
use crate::store::CatalogSnapshot;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmappedName {
    pub name: String,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub jurisdiction: Jurisdiction,
    pub total_occurrences: usize,
    pub mapped: usize,
    /// Matched a rule, but the day numeral lies outside this jurisdiction's span.
    pub out_of_span: usize,
    /// Most frequent first.
    pub unmapped: Vec<UnmappedName>,
    pub tag_hits: BTreeMap<String, usize>,
    /// Visible tags no occurrence resolved to. The weekly rest tag is never
    /// reported here.
    pub unused_tags: Vec<String>,
}

impl CoverageReport {
    pub fn unmapped_count(&self) -> usize {
        self.unmapped.iter().map(|u| u.dates.len()).sum()
    }

    pub fn coverage_percent(&self) -> f64 {
        if self.total_occurrences == 0 {
            return 100.0;
        }
        self.mapped as f64 * 100.0 / self.total_occurrences as f64
    }
}

/// Resolves every occurrence between `from` and `to`, both inclusive.
pub fn audit(
    snapshot: &CatalogSnapshot,
    source: &dyn CalendarSource,
    from: NaiveDate,
    to: NaiveDate,
    jurisdiction: Jurisdiction,
) -> CoverageReport {
    let mut total_occurrences = 0;
    let mut mapped = 0;
    let mut out_of_span = 0;
    let mut unmapped: HashMap<String, Vec<NaiveDate>> = HashMap::new();
    let mut tag_hits: BTreeMap<String, usize> = BTreeMap::new();

    let mut date = from;
    while date <= to {
        for occurrence in source.occurrences(date, jurisdiction) {
            total_occurrences += 1;
            match snapshot.resolve_event(&occurrence.name, jurisdiction, TransliterationStyle::default()) {
                Some(event) => {
                    mapped += 1;
                    *tag_hits.entry(event.tag_key).or_insert(0) += 1;
                }
                None if snapshot.resolve(&occurrence.name).is_some() => out_of_span += 1,
                None => unmapped.entry(occurrence.name).or_default().push(date),
            }
        }
        match date.checked_add_days(Days::new(1)) {
            Some(next) => date = next,
            None => break,
        }
    }

    let mut unmapped: Vec<UnmappedName> = unmapped
        .into_iter()
        .map(|(name, dates)| UnmappedName { name, dates })
        .collect();
    unmapped.sort_by(|a, b| b.dates.len().cmp(&a.dates.len()).then_with(|| a.name.cmp(&b.name)));

    let unused_tags = snapshot
        .registry
        .visible()
        .filter(|t| !snapshot.is_rest_tag(&t.key) && !tag_hits.contains_key(&t.key))
        .map(|t| t.key.clone())
        .collect();

    if !unmapped.is_empty() {
        log::warn!(
            "{} distinct occurrence names between {} and {} are not mapped",
            unmapped.len(),
            from,
            to
        );
    }

    CoverageReport {
        from,
        to,
        jurisdiction,
        total_occurrences,
        mapped,
        out_of_span,
        unmapped,
        tag_hits,
        unused_tags,
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Coverage {} .. {} ({}): {}/{} mapped ({:.1}%)",
            self.from,
            self.to,
            self.jurisdiction,
            self.mapped,
            self.total_occurrences,
            self.coverage_percent()
        )?;
        if self.out_of_span > 0 {
            writeln!(f, "Outside span for this jurisdiction: {}", self.out_of_span)?;
        }
        if !self.unmapped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Unmapped names:")?;
            for entry in &self.unmapped {
                let dates: Vec<String> = entry.dates.iter().map(|d| d.to_string()).collect();
                writeln!(f, "  {:>3}x  {}  [{}]", entry.dates.len(), entry.name, dates.join(", "))?;
            }
        }
        if !self.unused_tags.is_empty() {
            writeln!(f)?;
            writeln!(f, "Tags never matched: {}", self.unused_tags.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::RawOccurrence;
    use crate::source::StaticCalendar;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn counts_mapped_unmapped_and_out_of_span() {
        let snapshot = CatalogSnapshot::build(Catalog::builtin().unwrap(), "shabbos").unwrap();
        let mut cal = StaticCalendar::new();
        cal.add(date("2025-03-14"), RawOccurrence::new("Purim"))
            .add(date("2025-03-14"), RawOccurrence::new("Omer 1"))
            .add(date("2025-03-15"), RawOccurrence::new("Omer 1"))
            .add(date("2025-03-15"), RawOccurrence::new("Lag BaOmer"))
            .add(date("2025-04-20"), RawOccurrence::festival("Pesach VIII"));

        let report = audit(
            &snapshot,
            &cal,
            date("2025-03-01"),
            date("2025-04-30"),
            Jurisdiction::Israel,
        );
        assert_eq!(report.total_occurrences, 5);
        assert_eq!(report.mapped, 1);
        assert_eq!(report.out_of_span, 1);
        assert_eq!(report.unmapped_count(), 3);
        assert_eq!(report.unmapped[0].name, "Omer 1");
        assert_eq!(report.unmapped[0].dates.len(), 2);
        assert_eq!(report.tag_hits.get("purim"), Some(&1));
        assert!(report.unused_tags.contains(&"chanukah".to_string()));
        assert!(!report.unused_tags.contains(&"purim".to_string()));
        assert!(!report.unused_tags.contains(&"shabbos".to_string()));
        assert!(!report.unused_tags.contains(&"fast_day".to_string()));

        let text = report.to_string();
        assert!(text.contains("1/5 mapped"));
        assert!(text.contains("Lag BaOmer"));
    }
}
