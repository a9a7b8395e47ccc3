use std::collections::HashSet;

use super::types::Suggestion;
use super::MIN_QUERY_CHARS;
use crate::domain::product::Product;

/// Turns backend search hits into de-duplicated suggestions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuggestionMatcher {
    min_query_chars: usize,
}

impl Default for SuggestionMatcher {
    fn default() -> Self {
        Self { min_query_chars: MIN_QUERY_CHARS }
    }
}

impl SuggestionMatcher {
    pub fn new(min_query_chars: usize) -> Self {
        Self { min_query_chars: min_query_chars.max(1) }
    }

    /// Whether `query` is long enough to be worth a backend lookup.
    pub fn accepts(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_chars
    }

    /// A product is suggested when its title or brand contains the query,
    /// a brand or category when its own text does. Matching ignores case.
    /// Output follows candidate order, one entry per distinct lower-cased
    /// text and kind, first occurrence wins.
    pub fn suggest(&self, query: &str, candidates: &[Product]) -> Vec<Suggestion> {
        if !self.accepts(query) {
            return Vec::new();
        }

        let needle = query.trim().to_lowercase();
        let mut seen_titles = HashSet::new();
        let mut seen_brands = HashSet::new();
        let mut seen_categories = HashSet::new();
        let mut suggestions = Vec::new();

        for product in candidates {
            let title = product.title.trim();
            let brand_hit = product
                .brand
                .as_deref()
                .map_or(false, |brand| brand.to_lowercase().contains(&needle));
            let listed = title.to_lowercase().contains(&needle) || brand_hit;
            if !title.is_empty() && listed && seen_titles.insert(title.to_lowercase()) {
                suggestions.push(Suggestion::Product {
                    id: product.id.clone(),
                    text: title.to_string(),
                    brand: non_blank(product.brand.as_deref()),
                    category: non_blank(Some(product.category.as_str())),
                });
            }

            if let Some(brand) = non_blank(product.brand.as_deref()) {
                let key = brand.to_lowercase();
                if key.contains(&needle) && seen_brands.insert(key) {
                    suggestions.push(Suggestion::Brand { text: brand });
                }
            }

            if let Some(category) = non_blank(Some(product.category.as_str())) {
                let key = category.to_lowercase();
                if key.contains(&needle) && seen_categories.insert(key) {
                    suggestions.push(Suggestion::Category { text: category });
                }
            }
        }

        suggestions
    }
}

/// Suggestions for `query` using the default two-character threshold.
pub fn suggest(query: &str, candidates: &[Product]) -> Vec<Suggestion> {
    SuggestionMatcher::default().suggest(query, candidates)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}
