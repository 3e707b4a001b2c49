// Occurrence resolver: maps one raw occurrence name to at most one rule.
//
// Two tiers. Literal names are looked up in a hash map; everything else falls
// through to the compiled patterns, tried in a fixed order. A literal match
// always beats a pattern match, whatever the priorities say.
use crate::error::CatalogError;
use crate::extraction::parse_numeral;
use crate::model::{MappingRule, MatchKind};
use crate::registry::TagRegistry;
use regex::Regex;
use std::collections::HashMap;

/// Compiles a pattern rule the way the resolver evaluates it: case sensitive
/// and anchored at the start of the name.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})", pattern))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub tag_key: String,
    /// Index into `RuleTable::rules`.
    pub rule_index: usize,
    pub kind: MatchKind,
    /// Day numeral from the pattern's `day` group, when it has one.
    pub captured_day: Option<u32>,
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    rule_index: usize,
    regex: Regex,
}

#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<MappingRule>,
    exact: HashMap<String, usize>,
    patterns: Vec<CompiledPattern>,
}

impl RuleTable {
    /// Compiles every pattern rule. Fails with every invalid pattern listed.
    pub fn build(rules: &[MappingRule], registry: &TagRegistry) -> Result<Self, CatalogError> {
        let mut exact = HashMap::new();
        let mut patterns = Vec::new();
        let mut errors = Vec::new();

        for (idx, rule) in rules.iter().enumerate() {
            match rule.kind {
                MatchKind::Exact => {
                    exact.entry(rule.pattern.clone()).or_insert(idx);
                }
                MatchKind::Pattern => match compile_pattern(&rule.pattern) {
                    Ok(regex) => patterns.push(CompiledPattern {
                        rule_index: idx,
                        regex,
                    }),
                    Err(source) => errors.push(CatalogError::InvalidPattern {
                        tag: rule.tag.clone(),
                        pattern: rule.pattern.clone(),
                        source,
                    }),
                },
            }
        }
        CatalogError::from_list(errors)?;

        // Priority descending, then tag display order, then tag key, then pattern.
        patterns.sort_by(|a, b| {
            let ra = &rules[a.rule_index];
            let rb = &rules[b.rule_index];
            let rank = |key: &str| registry.get(key).map_or(i32::MAX, |t| t.sort_order);
            rb.priority
                .cmp(&ra.priority)
                .then_with(|| rank(&ra.tag).cmp(&rank(&rb.tag)))
                .then_with(|| ra.tag.cmp(&rb.tag))
                .then_with(|| ra.pattern.cmp(&rb.pattern))
        });

        Ok(Self {
            rules: rules.to_vec(),
            exact,
            patterns,
        })
    }

    pub fn resolve(&self, name: &str) -> Option<RuleMatch> {
        if let Some(&idx) = self.exact.get(name) {
            let rule = &self.rules[idx];
            log::debug!("'{}' -> {} (exact)", name, rule.tag);
            return Some(RuleMatch {
                tag_key: rule.tag.clone(),
                rule_index: idx,
                kind: MatchKind::Exact,
                captured_day: None,
            });
        }

        for compiled in &self.patterns {
            let Some(caps) = compiled.regex.captures(name) else {
                continue;
            };
            let rule = &self.rules[compiled.rule_index];
            let captured_day = caps.name("day").and_then(|m| parse_numeral(m.as_str()));
            log::debug!(
                "'{}' -> {} (pattern '{}', priority {})",
                name,
                rule.tag,
                rule.pattern,
                rule.priority
            );
            return Some(RuleMatch {
                tag_key: rule.tag.clone(),
                rule_index: compiled.rule_index,
                kind: MatchKind::Pattern,
                captured_day,
            });
        }

        log::debug!("'{}' matched no rule", name);
        None
    }

    pub fn rule(&self, index: usize) -> Option<&MappingRule> {
        self.rules.get(index)
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    /// Pattern rules in evaluation order.
    pub fn pattern_order(&self) -> impl Iterator<Item = &MappingRule> {
        self.patterns.iter().map(|p| &self.rules[p.rule_index])
    }

    pub fn exact_count(&self) -> usize {
        self.exact.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
