// Entry point for callers: classify a date for a location.
//
// Requests never fail. An unmapped or unusual date yields an empty context.
use crate::catalog::Catalog;
use crate::classifier::{DayClassifier, EventDayInfo};
use crate::config::Settings;
use crate::context::AppContext;
use crate::error::CatalogError;
use crate::model::{Jurisdiction, Location, ResolvedEvent, TransliterationStyle};
use crate::source::CalendarSource;
use crate::storage::LocalStorage;
use crate::store::{CatalogSnapshot, CatalogStore, ReloadOutcome};
use crate::zmanim_context::{ContextBuilder, ZmanimContext};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct ZmanimService<S: CalendarSource> {
    store: CatalogStore,
    source: S,
    style: TransliterationStyle,
}

impl<S: CalendarSource> ZmanimService<S> {
    pub fn new(store: CatalogStore, source: S) -> Self {
        Self {
            store,
            source,
            style: TransliterationStyle::default(),
        }
    }

    pub fn with_style(mut self, style: TransliterationStyle) -> Self {
        self.style = style;
        self
    }

    /// Builds a service from settings: the configured catalog file when set,
    /// otherwise the built-in catalog.
    pub fn from_settings(settings: &Settings, ctx: &dyn AppContext, source: S) -> Result<Self> {
        let catalog = match catalog_path(settings, ctx)? {
            Some(path) => Catalog::load(&path)?,
            None => Catalog::builtin()?,
        };
        let store = CatalogStore::new(catalog, &settings.weekly_rest_tag)
            .context("Catalog rejected")?;
        Ok(Self::new(store, source).with_style(settings.transliteration))
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.store.snapshot()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn style(&self) -> TransliterationStyle {
        self.style
    }

    /// Tags in effect for `date` at `location`.
    pub fn zmanim_context(&self, date: NaiveDate, location: &Location) -> ZmanimContext {
        let snapshot = self.store.snapshot();
        let jurisdiction = location.jurisdiction();
        let classification =
            DayClassifier::new(&snapshot, jurisdiction, self.style).classify(&self.source, date);
        let ctx = ContextBuilder::new(&snapshot.weekly_rest_tag).from_classification(&classification);
        log::info!(
            "Context for {} ({}): active={:?} display={:?}",
            date,
            jurisdiction,
            ctx.active_event_codes,
            ctx.display_contexts
        );
        ctx
    }

    pub fn event_day_info(
        &self,
        date: NaiveDate,
        location: &Location,
        style: TransliterationStyle,
    ) -> EventDayInfo {
        let snapshot = self.store.snapshot();
        DayClassifier::new(&snapshot, location.jurisdiction(), style).day_info(&self.source, date)
    }

    /// Resolves a single occurrence name, as it would be on some date.
    pub fn resolve_name(&self, name: &str, jurisdiction: Jurisdiction) -> Option<ResolvedEvent> {
        self.store
            .snapshot()
            .resolve_event(name, jurisdiction, self.style)
    }

    pub fn reload(&self, catalog: Catalog) -> Result<ReloadOutcome, CatalogError> {
        self.store.reload(catalog)
    }

    pub fn reload_from(&self, path: &Path) -> Result<ReloadOutcome> {
        let contents = LocalStorage::read_locked(path)?;
        let catalog: Catalog = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog '{}'", path.display()))?;
        Ok(self.reload(catalog)?)
    }
}

/// The catalog file to use: explicit setting, else an existing file in the
/// config directory, else none (built-in catalog).
pub fn catalog_path(settings: &Settings, ctx: &dyn AppContext) -> Result<Option<PathBuf>> {
    if let Some(path) = &settings.catalog_path {
        return Ok(Some(path.clone()));
    }
    let default = ctx.get_catalog_path()?;
    Ok(default.exists().then_some(default))
}
