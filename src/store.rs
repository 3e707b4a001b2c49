// Live catalog snapshots with swap-on-success reloads.
//
// Classification only ever sees an `Arc<CatalogSnapshot>`. The lock guards
// nothing but the pointer, so readers hold it for one `Arc` clone and a reload
// never waits on in-flight classifications. The write side is held only for
// the pointer swap; building and validating happen before it is taken.
use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::extraction;
use crate::model::{Jurisdiction, ResolvedEvent, Tag, TransliterationStyle};
use crate::registry::TagRegistry;
use crate::resolver::{RuleMatch, RuleTable};
use std::sync::{Arc, PoisonError, RwLock};

/// An immutable, fully validated catalog ready for classification.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    pub registry: TagRegistry,
    pub rules: RuleTable,
    pub weekly_rest_tag: String,
    pub fingerprint: u64,
}

impl CatalogSnapshot {
    /// Validates `catalog` and compiles its rules. Reports every problem.
    pub fn build(catalog: Catalog, weekly_rest_tag: &str) -> Result<Self, CatalogError> {
        let mut errors = match catalog.validate() {
            Ok(()) => Vec::new(),
            Err(e) => e.into_problems(),
        };
        if catalog.tag(weekly_rest_tag).is_none() {
            errors.push(CatalogError::UnknownRestTag(weekly_rest_tag.to_string()));
        }
        CatalogError::from_list(errors)?;

        let registry = TagRegistry::new(catalog.tags.clone());
        let rules = RuleTable::build(&catalog.rules, &registry)?;
        let fingerprint = catalog.fingerprint();

        Ok(Self {
            catalog,
            registry,
            rules,
            weekly_rest_tag: weekly_rest_tag.to_string(),
            fingerprint,
        })
    }

    pub fn resolve(&self, name: &str) -> Option<RuleMatch> {
        self.rules.resolve(name)
    }

    /// Resolves a raw occurrence name into a full event for one jurisdiction.
    pub fn resolve_event(
        &self,
        name: &str,
        jurisdiction: Jurisdiction,
        style: TransliterationStyle,
    ) -> Option<ResolvedEvent> {
        let matched = self.rules.resolve(name)?;
        let rule = self.rules.rule(matched.rule_index)?;
        let tag = self.registry.get(&matched.tag_key)?;
        let span = extraction::extract(name, matched.captured_day, rule, tag, jurisdiction)?;
        Some(Self::event_from_tag(
            tag,
            span.day_number,
            span.total_days,
            style,
            Some(name.to_string()),
        ))
    }

    /// The weekly rest day, which no calendar generator reports.
    pub fn rest_day_event(&self, style: TransliterationStyle) -> Option<ResolvedEvent> {
        let tag = self.registry.get(&self.weekly_rest_tag)?;
        Some(Self::event_from_tag(tag, 1, 1, style, None))
    }

    pub fn is_rest_tag(&self, key: &str) -> bool {
        key == self.weekly_rest_tag
    }

    fn event_from_tag(
        tag: &Tag,
        day_number: u32,
        total_days: u32,
        style: TransliterationStyle,
        source_name: Option<String>,
    ) -> ResolvedEvent {
        ResolvedEvent {
            tag_key: tag.key.clone(),
            name_hebrew: tag.names.hebrew.clone(),
            name_english: tag.names.english(style).to_string(),
            day_number,
            total_days,
            is_final_day: day_number == total_days,
            fast_start: tag.fast_start,
            sanctity: tag.sanctity,
            hidden: tag.hidden,
            source_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The new catalog is identical to the active one; nothing was swapped.
    Unchanged,
    Replaced { fingerprint: u64 },
}

#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog, weekly_rest_tag: &str) -> Result<Self, CatalogError> {
        let snapshot = CatalogSnapshot::build(catalog, weekly_rest_tag)?;
        log::info!(
            "Catalog loaded: {} tags, {} exact rules, {} pattern rules",
            snapshot.registry.len(),
            snapshot.rules.exact_count(),
            snapshot.rules.pattern_count()
        );
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// The active snapshot. Callers keep it for the whole classification.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Builds a snapshot from `catalog` and swaps it in.
    ///
    /// On error the active snapshot stays in effect.
    pub fn reload(&self, catalog: Catalog) -> Result<ReloadOutcome, CatalogError> {
        let active = self.snapshot();
        let snapshot = match CatalogSnapshot::build(catalog, &active.weekly_rest_tag) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Catalog reload rejected, keeping the active catalog: {}", e);
                return Err(e);
            }
        };

        if snapshot.fingerprint == active.fingerprint {
            log::info!("Catalog reload: no changes");
            return Ok(ReloadOutcome::Unchanged);
        }

        let fingerprint = snapshot.fingerprint;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        log::info!("Catalog reloaded (fingerprint {:016x})", fingerprint);
        Ok(ReloadOutcome::Replaced { fingerprint })
    }
}
