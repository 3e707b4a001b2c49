// The tag catalog: every tag and every mapping rule, as configuration data.
//
// Adding support for a new calendar occurrence is an edit to this data, never
// a code change. All invariants are checked here, before a catalog can be
// turned into a live snapshot.
use crate::error::CatalogError;
use crate::model::{FastStart, MappingRule, MatchKind, Tag, TagType};
use crate::resolver::compile_pattern;
use crate::storage::LocalStorage;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub rules: Vec<MappingRule>,
}

impl Catalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG).context("Built-in catalog is invalid")
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(contents)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = LocalStorage::read_locked(path)?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load catalog '{}'", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let contents = self.to_toml_string()?;
        LocalStorage::write_locked(path, &contents)
    }

    pub fn tag(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.key == key)
    }

    /// Stable content hash, used to tell whether a reload changed anything.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.to_toml_string().unwrap_or_default().hash(&mut hasher);
        hasher.finish()
    }

    /// Checks every configuration invariant and reports all violations.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut errors = Vec::new();

        let mut keys = HashSet::new();
        for tag in &self.tags {
            if tag.key.trim().is_empty() {
                errors.push(CatalogError::EmptyTagKey(tag.names.ashkenazi.clone()));
                continue;
            }
            if !keys.insert(tag.key.as_str()) {
                errors.push(CatalogError::DuplicateTag(tag.key.clone()));
            }
            Self::validate_tag(tag, &mut errors);
        }

        let mut seen: HashSet<(&str, MatchKind)> = HashSet::new();
        for rule in &self.rules {
            if !keys.contains(rule.tag.as_str()) {
                errors.push(CatalogError::UnknownTag {
                    pattern: rule.pattern.clone(),
                    tag: rule.tag.clone(),
                });
            }
            if !seen.insert(rule.identity()) {
                errors.push(CatalogError::DuplicatePattern {
                    kind: rule.kind,
                    pattern: rule.pattern.clone(),
                });
            }
            if rule.kind == MatchKind::Pattern
                && let Err(source) = compile_pattern(&rule.pattern)
            {
                errors.push(CatalogError::InvalidPattern {
                    tag: rule.tag.clone(),
                    pattern: rule.pattern.clone(),
                    source,
                });
            }
            if rule.total_days.values().any(|n| n == 0) {
                errors.push(CatalogError::ZeroTotalDays(rule.tag.clone()));
            }
            if rule.day_number == Some(0) {
                errors.push(CatalogError::ZeroDayNumber(rule.tag.clone()));
            }
        }

        CatalogError::from_list(errors)
    }

    fn validate_tag(tag: &Tag, errors: &mut Vec<CatalogError>) {
        if tag.total_days.values().any(|n| n == 0) {
            errors.push(CatalogError::ZeroTotalDays(tag.key.clone()));
        }
        if let Some(day_number) = tag.day_number {
            if day_number == 0 {
                errors.push(CatalogError::ZeroDayNumber(tag.key.clone()));
            }
            let smallest_total = tag.total_days.values().min().unwrap_or(1);
            if day_number > smallest_total {
                errors.push(CatalogError::DayNumberExceedsTotal {
                    tag: tag.key.clone(),
                    day_number,
                    total_days: smallest_total,
                });
            }
        }
        if tag.fast_start != FastStart::None && tag.tag_type != TagType::Event {
            errors.push(CatalogError::FastTimingOnNonEvent {
                tag: tag.key.clone(),
                tag_type: tag.tag_type,
            });
        }
    }

    /// Number of rules per tag key.
    pub fn rule_counts(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for rule in &self.rules {
            *counts.entry(rule.tag.as_str()).or_insert(0) += 1;
        }
        counts
    }

    // --- Admin edits ---
    //
    // Each edit works on a copy and only replaces `self` once the edited
    // catalog validates, so a rejected edit leaves the catalog untouched.

    fn commit(&mut self, edited: Catalog) -> Result<(), CatalogError> {
        edited.validate()?;
        *self = edited;
        Ok(())
    }

    pub fn upsert_tag(&mut self, tag: Tag) -> Result<(), CatalogError> {
        let mut edited = self.clone();
        match edited.tags.iter_mut().find(|t| t.key == tag.key) {
            Some(existing) => *existing = tag,
            None => edited.tags.push(tag),
        }
        self.commit(edited)
    }

    /// Removes a tag no rule references. Returns the removed tag, if any.
    pub fn remove_tag(&mut self, key: &str) -> Result<Option<Tag>, CatalogError> {
        let rules = self.rules.iter().filter(|r| r.tag == key).count();
        if rules > 0 {
            return Err(CatalogError::TagInUse {
                tag: key.to_string(),
                rules,
            });
        }
        let Some(idx) = self.tags.iter().position(|t| t.key == key) else {
            return Ok(None);
        };
        Ok(Some(self.tags.remove(idx)))
    }

    /// Inserts a rule, replacing any rule with the same pattern and kind.
    pub fn upsert_rule(&mut self, rule: MappingRule) -> Result<(), CatalogError> {
        let mut edited = self.clone();
        match edited
            .rules
            .iter_mut()
            .find(|r| r.identity() == rule.identity())
        {
            Some(existing) => *existing = rule,
            None => edited.rules.push(rule),
        }
        self.commit(edited)
    }

    pub fn remove_rule(
        &mut self,
        kind: MatchKind,
        pattern: &str,
    ) -> Result<MappingRule, CatalogError> {
        let idx = self
            .rules
            .iter()
            .position(|r| r.kind == kind && r.pattern == pattern)
            .ok_or_else(|| CatalogError::UnknownRule {
                kind,
                pattern: pattern.to_string(),
            })?;
        Ok(self.rules.remove(idx))
    }
}
