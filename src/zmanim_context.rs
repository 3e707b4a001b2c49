// Flattens a day classification into the two tag collections that formula
// filtering consumes.
use crate::classifier::DayClassification;
use crate::model::{FastStart, ResolvedEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZmanimContext {
    /// Every tag in effect for filtering.
    pub active_event_codes: BTreeSet<String>,
    /// Tags used to group and label results, in insertion order.
    pub display_contexts: Vec<String>,
}

impl ZmanimContext {
    pub fn is_empty(&self) -> bool {
        self.active_event_codes.is_empty() && self.display_contexts.is_empty()
    }

    pub fn is_active(&self, code: &str) -> bool {
        self.active_event_codes.contains(code)
    }

    pub fn has_display_context(&self, code: &str) -> bool {
        self.display_contexts.iter().any(|c| c == code)
    }

    fn add_active(&mut self, code: &str) {
        self.active_event_codes.insert(code.to_string());
    }

    /// Hidden tags still gate formulas but are never shown.
    fn add_display(&mut self, event: &ResolvedEvent) {
        if !event.hidden && !self.has_display_context(&event.tag_key) {
            self.display_contexts.push(event.tag_key.clone());
        }
    }
}

pub struct ContextBuilder<'a> {
    weekly_rest_tag: &'a str,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(weekly_rest_tag: &'a str) -> Self {
        Self { weekly_rest_tag }
    }

    pub fn from_classification(&self, classification: &DayClassification) -> ZmanimContext {
        self.build(
            &classification.active,
            &classification.eve,
            &classification.night_after,
        )
    }

    /// The rules run in this order and every one of them always runs.
    pub fn build(
        &self,
        active: &[ResolvedEvent],
        eve: &[ResolvedEvent],
        night_after: &[ResolvedEvent],
    ) -> ZmanimContext {
        let mut ctx = ZmanimContext::default();

        // 1. Everything in effect today gates formulas.
        for event in active {
            ctx.add_active(&event.tag_key);
        }

        // 2. Tonight already belongs to tomorrow's rest day or festival.
        for event in eve {
            if event.tag_key == self.weekly_rest_tag || event.is_festival() {
                ctx.add_active(&event.tag_key);
                ctx.add_display(event);
            }
        }

        // 3. Closing events only label results.
        for event in night_after {
            ctx.add_display(event);
        }

        // 4. Fasts in effect today.
        for event in active {
            if event.fast_start.is_fast() {
                ctx.add_display(event);
            }
        }

        // 5. Fasts starting at sunset tonight.
        for event in eve {
            if event.fast_start == FastStart::Sunset {
                ctx.add_display(event);
            }
        }

        ctx
    }
}
