use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Product,
    Brand,
    Category,
}

/// One entry in the search box dropdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suggestion {
    Product {
        id: ProductId,
        text: String,
        /// Shown next to the title; empty brand and category are omitted.
        brand: Option<String>,
        category: Option<String>,
    },
    Brand {
        text: String,
    },
    Category {
        text: String,
    },
}

/// Where selecting a suggestion takes the shopper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", content = "value", rename_all = "snake_case")]
pub enum NavigationTarget {
    Product(ProductId),
    Category(String),
    Search(String),
}

impl Suggestion {
    pub fn kind(&self) -> SuggestionKind {
        match self {
            Self::Product { .. } => SuggestionKind::Product,
            Self::Brand { .. } => SuggestionKind::Brand,
            Self::Category { .. } => SuggestionKind::Category,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Product { text, .. } | Self::Brand { text } | Self::Category { text } => text,
        }
    }

    /// Brands open a full search for the brand name.
    pub fn target(&self) -> NavigationTarget {
        match self {
            Self::Product { id, .. } => NavigationTarget::Product(id.clone()),
            Self::Category { text } => NavigationTarget::Category(text.clone()),
            Self::Brand { text } => NavigationTarget::Search(text.trim().to_string()),
        }
    }
}
