//! Day-number and span-length extraction for multi-day occurrences.
//!
//! Calendar generators number festival days inside the name ("Pesach III",
//! "Chanukah: 3 Candles", "Chanukah: 8th Day"). The span length comes from the
//! catalog and may differ between jurisdictions, so a numeral that is valid in
//! one place can fall outside the span in another.

use crate::model::{Jurisdiction, MappingRule, Tag};
use once_cell::sync::Lazy;
use regex::Regex;

/// One- or two-digit numbers, optionally with an English ordinal suffix.
static ARABIC_NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?$").unwrap());

const ROMAN_NUMERALS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// Parses a single token as a day numeral.
pub fn parse_numeral(token: &str) -> Option<u32> {
    if let Some(caps) = ARABIC_NUMERAL.captures(token) {
        return caps[1].parse().ok().filter(|&n| n > 0);
    }
    ROMAN_NUMERALS
        .iter()
        .position(|&r| r == token)
        .map(|idx| idx as u32 + 1)
}

/// First whitespace-separated token of `name` that reads as a day numeral.
/// Surrounding punctuation is ignored, so "(VII)" and "3," both count.
pub fn find_numeral(name: &str) -> Option<u32> {
    name.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .find_map(parse_numeral)
}

/// Position of one occurrence within its tag's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    pub day_number: u32,
    pub total_days: u32,
}

impl DaySpan {
    pub fn is_final_day(&self) -> bool {
        self.day_number == self.total_days
    }
}

/// Span length: rule override, else the tag's value, else a single day.
pub fn total_days(rule: &MappingRule, tag: &Tag, jurisdiction: Jurisdiction) -> u32 {
    rule.total_days
        .get(jurisdiction)
        .or_else(|| tag.total_days_for(jurisdiction))
        .unwrap_or(1)
}

/// Derives the day span for a matched occurrence.
///
/// Returns `None` when the numeral in the name lies outside the span for this
/// jurisdiction, e.g. "Pesach VIII" where Pesach lasts seven days.
pub fn extract(
    name: &str,
    captured_day: Option<u32>,
    rule: &MappingRule,
    tag: &Tag,
    jurisdiction: Jurisdiction,
) -> Option<DaySpan> {
    let total_days = total_days(rule, tag, jurisdiction);
    let fallback = tag.day_number.unwrap_or(1);

    let day_number = match rule.day_number {
        Some(fixed) => fixed,
        None if total_days > 1 => match captured_day.or_else(|| find_numeral(name)) {
            Some(numeral) => {
                let offset = rule.numeral_offset.get(jurisdiction).unwrap_or(0);
                numeral.checked_sub(offset)?
            }
            None => fallback,
        },
        None => fallback,
    };

    if day_number == 0 || day_number > total_days {
        log::debug!(
            "'{}': day {} is outside the {}-day span of '{}' ({})",
            name,
            day_number,
            total_days,
            tag.key,
            jurisdiction
        );
        return None;
    }

    Some(DaySpan {
        day_number,
        total_days,
    })
}
