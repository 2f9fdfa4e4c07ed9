use std::fmt;
use std::sync::Arc;

use crate::catalog::entry::FontEntry;

/// Entry field a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Family,
    Category,
}

impl SearchField {
    /// Field value of `entry`; a missing category reads as empty.
    pub fn value<'a>(&self, entry: &'a FontEntry) -> &'a str {
        match self {
            SearchField::Family => entry.family(),
            SearchField::Category => entry.category().unwrap_or_default(),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchField::Family => f.write_str("family"),
            SearchField::Category => f.write_str("category"),
        }
    }
}

/// Which filter produced a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTag {
    pub field: SearchField,
    pub term: String,
}

/// Ordered entries plus the filter that produced them. Entries are shared,
/// so narrowing a view never copies font records.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    entries: Vec<Arc<FontEntry>>,
    filter: Option<FilterTag>,
}

/// Outcome of resolving a user-supplied family name to one entry.
#[derive(Debug, Clone)]
pub enum SingleMatch {
    Found(Arc<FontEntry>),
    NotFound,
    Ambiguous(CatalogView),
}

impl CatalogView {
    pub fn new(entries: Vec<Arc<FontEntry>>) -> Self {
        Self { entries, filter: None }
    }

    pub fn entries(&self) -> &[Arc<FontEntry>] {
        &self.entries
    }

    pub fn filter(&self) -> Option<&FilterTag> {
        self.filter.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FontEntry>> {
        self.entries.iter()
    }

    pub fn families(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.family()).collect()
    }

    /// Conjunctive, order-independent substring search. A blank term matches nothing.
    pub fn search(&self, term: &str, field: SearchField) -> CatalogView {
        let needle = term.trim().to_lowercase();
        let tokens: Vec<&str> = needle.split_whitespace().collect();
        let entries = if tokens.is_empty() {
            Vec::new()
        } else {
            self.select(|entry| {
                let haystack = field.value(entry).to_lowercase();
                tokens.iter().all(|token| haystack.contains(token))
            })
        };
        self.tagged(entries, field, term)
    }

    /// Case-insensitive equality against the trimmed term.
    pub fn exact_match(&self, term: &str, field: SearchField) -> CatalogView {
        let needle = term.trim().to_lowercase();
        let entries = self.select(|entry| field.value(entry).to_lowercase() == needle);
        self.tagged(entries, field, term)
    }

    pub fn search_family(&self, term: &str) -> CatalogView {
        self.search(term, SearchField::Family)
    }

    pub fn search_category(&self, term: &str) -> CatalogView {
        self.search(term, SearchField::Category)
    }

    pub fn exact_family(&self, term: &str) -> CatalogView {
        self.exact_match(term, SearchField::Family)
    }

    pub fn exact_category(&self, term: &str) -> CatalogView {
        self.exact_match(term, SearchField::Category)
    }

    /// An exact family match wins; otherwise a fuzzy family search must
    /// narrow to exactly one entry.
    pub fn resolve_single(&self, name: &str) -> SingleMatch {
        let exact = self.exact_family(name);
        if exact.len() == 1 {
            return SingleMatch::Found(exact.entries[0].clone());
        }
        if exact.len() > 1 {
            return SingleMatch::Ambiguous(exact);
        }
        let fuzzy = self.search_family(name);
        match fuzzy.len() {
            0 => SingleMatch::NotFound,
            1 => SingleMatch::Found(fuzzy.entries[0].clone()),
            _ => SingleMatch::Ambiguous(fuzzy),
        }
    }

    fn select(&self, keep: impl Fn(&FontEntry) -> bool) -> Vec<Arc<FontEntry>> {
        self.entries
            .iter()
            .filter(|entry| keep(entry))
            .cloned()
            .collect()
    }

    fn tagged(&self, entries: Vec<Arc<FontEntry>>, field: SearchField, term: &str) -> CatalogView {
        CatalogView {
            entries,
            filter: Some(FilterTag {
                field,
                term: term.trim().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view() -> CatalogView {
        let raw = [
            json!({"family": "Source Code Pro", "category": "monospace"}),
            json!({"family": "Source Sans Pro", "category": "sans-serif"}),
            json!({"family": "Source Serif Pro", "category": "serif"}),
            json!({"family": "Roboto", "category": "sans-serif"}),
            json!({"family": "Roboto Mono"}),
        ];
        CatalogView::new(raw.iter().map(|r| Arc::new(FontEntry::from_raw(r))).collect())
    }

    #[test]
    fn blank_term_matches_nothing() {
        let view = view();
        assert!(view.search("", SearchField::Family).is_empty());
        assert!(view.search("   \t", SearchField::Category).is_empty());
    }

    #[test]
    fn search_tags_view_with_term_and_field() {
        let result = view().search_family("source");
        assert_eq!(
            result.families(),
            ["Source Code Pro", "Source Sans Pro", "Source Serif Pro"]
        );
        assert_eq!(
            result.filter(),
            Some(&FilterTag { field: SearchField::Family, term: "source".to_string() })
        );
        assert!(view().filter().is_none());
    }

    #[test]
    fn token_order_does_not_matter() {
        let view = view();
        let a = view.search_family("source sans");
        let b = view.search_family("sans source");
        assert_eq!(a.families(), ["Source Sans Pro"]);
        assert_eq!(a.families(), b.families());
    }

    #[test]
    fn every_entry_matches_its_own_field_value() {
        let view = view();
        for entry in view.iter() {
            assert!(view.search_family(entry.family()).iter().any(|e| Arc::ptr_eq(e, entry)));
            if let Some(category) = entry.category() {
                assert!(view.search_category(category).iter().any(|e| Arc::ptr_eq(e, entry)));
            }
        }
    }

    #[test]
    fn missing_category_reads_as_empty() {
        let result = view().search_category("mono");
        assert_eq!(result.families(), ["Source Code Pro"]);
    }

    #[test]
    fn exact_match_is_case_insensitive_equality() {
        let view = view();
        assert_eq!(view.exact_family("  roboto ").families(), ["Roboto"]);
        assert_eq!(view.exact_category("SANS-SERIF").families(), ["Source Sans Pro", "Roboto"]);
        assert!(view.exact_family("robot").is_empty());
    }

    #[test]
    fn resolve_single_prefers_exact_family() {
        let view = view();
        match view.resolve_single("Roboto") {
            SingleMatch::Found(entry) => assert_eq!(entry.family(), "Roboto"),
            other => panic!("expected a single match, got {:?}", other),
        }
        match view.resolve_single("mono") {
            SingleMatch::Found(entry) => assert_eq!(entry.family(), "Roboto Mono"),
            other => panic!("expected a single match, got {:?}", other),
        }
        assert!(matches!(view.resolve_single("source"), SingleMatch::Ambiguous(v) if v.len() == 3));
        assert!(matches!(view.resolve_single("comic"), SingleMatch::NotFound));
    }
}
