use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Derived; zero until counted against a product list or filled by the store.
    #[serde(default)]
    pub product_count: usize,
}

impl Category {
    /// Category names are unique ignoring case.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name)
    }

    pub fn with_product_count(mut self, products: &[Product]) -> Self {
        self.product_count =
            products.iter().filter(|product| self.matches_name(&product.category)).count();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name)
    }

    pub fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name.trim().to_string(),
            description: self.description.filter(|value| !value.trim().is_empty()),
            image: self.image,
            product_count: 0,
        }
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvariantViolation("category name must not be blank".into()));
    }
    Ok(())
}
