use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::pricing;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog product as returned by the backing store.
///
/// Optional fields stay optional; the substitution rules live on the
/// accessor methods (`discount_pct`, `is_featured`) instead of at each call site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Option<Decimal>,
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub rating: Option<Decimal>,
}

impl Product {
    /// Discount percent, with a missing discount read as zero.
    pub fn discount_pct(&self) -> Decimal {
        self.discount.unwrap_or(Decimal::ZERO)
    }

    pub fn final_price(&self) -> Decimal {
        pricing::final_price(self.price, self.discount_pct())
    }

    pub fn on_discount(&self) -> bool {
        pricing::has_discount(self.discount_pct())
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }

    /// Case-insensitive substring match of the trimmed `text` against title or brand.
    pub fn matches_text(&self, text: &str) -> bool {
        let needle = text.trim().to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.brand.as_deref().map_or(false, |brand| brand.to_lowercase().contains(&needle))
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_listing(&self.title, &self.category, self.price, self.discount)
    }
}

/// Admin-side input for a product that has no identifier yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Option<Decimal>,
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_listing(&self.title, &self.category, self.price, self.discount)
    }

    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            title: self.title.trim().to_string(),
            brand: self.brand.map(|brand| brand.trim().to_string()).filter(|b| !b.is_empty()),
            category: self.category.trim().to_string(),
            price: self.price,
            discount: self.discount,
            stock: self.stock,
            image: self.image,
            created_at: Some(created_at),
            featured: self.featured,
            rating: None,
        }
    }
}

fn validate_listing(
    title: &str,
    category: &str,
    price: Decimal,
    discount: Option<Decimal>,
) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::InvariantViolation("product title must not be blank".into()));
    }
    if category.trim().is_empty() {
        return Err(DomainError::InvariantViolation("product category must not be blank".into()));
    }
    if price < Decimal::ZERO {
        return Err(DomainError::NegativePrice(price));
    }
    if let Some(discount) = discount {
        if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
            return Err(DomainError::DiscountOutOfRange(discount));
        }
    }
    Ok(())
}
