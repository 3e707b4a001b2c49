// Read-only view of the catalog's tags, keyed for lookup.
use crate::model::{Tag, TransliterationStyle};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: Vec<Tag>,
    by_key: HashMap<String, usize>,
}

impl TagRegistry {
    /// Builds a registry in display order (`sort_order`, then key).
    ///
    /// Expects a validated tag list; with duplicate keys the first tag in
    /// display order wins.
    pub fn new(mut tags: Vec<Tag>) -> Self {
        tags.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.key.cmp(&b.key)));
        let mut by_key = HashMap::with_capacity(tags.len());
        for (idx, tag) in tags.iter().enumerate() {
            by_key.entry(tag.key.clone()).or_insert(idx);
        }
        Self { tags, by_key }
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.by_key.get(key).map(|&idx| &self.tags[idx])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Position of the tag in display order.
    pub fn display_rank(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Tags that may be shown to end users.
    pub fn visible(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|t| !t.hidden)
    }

    pub fn display_name(&self, key: &str, style: TransliterationStyle) -> Option<&str> {
        self.get(key).map(|t| t.names.english(style))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TagRegistry {
        TagRegistry::new(vec![
            Tag::new("purim", "Purim").with_sort_order(61),
            Tag::new("fast_day", "Fast Day").with_sort_order(200).hidden(),
            Tag::new("shabbos", "Shabbos").with_sort_order(10),
            Tag::new("chanukah", "Chanukah").with_sort_order(50),
            Tag::new("asarah_bteves", "Asarah B'Teves").with_sort_order(50),
        ])
    }

    #[test]
    fn iterates_in_display_order() {
        let keys: Vec<_> = registry().iter().map(|t| t.key.clone()).collect();
        assert_eq!(
            keys,
            vec!["shabbos", "asarah_bteves", "chanukah", "purim", "fast_day"]
        );
    }

    #[test]
    fn visible_skips_hidden() {
        let reg = registry();
        assert_eq!(reg.len(), 5);
        assert_eq!(reg.visible().count(), 4);
        assert!(reg.visible().all(|t| t.key != "fast_day"));
        assert!(reg.get("fast_day").is_some());
    }

    #[test]
    fn lookup_by_key() {
        let reg = registry();
        assert_eq!(reg.display_rank("shabbos"), Some(0));
        assert_eq!(
            reg.display_name("purim", TransliterationStyle::Sephardi),
            Some("Purim")
        );
        assert!(!reg.contains("missing"));
    }
}
