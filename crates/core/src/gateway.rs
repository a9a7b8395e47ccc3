//! Boundary to the hosted catalog store.
//!
//! Implementations only translate parameters into requests and rows into
//! domain records. Filtering, sorting, discount math and suggestion
//! de-duplication all happen after the data comes back.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::category::{Category, CategoryDraft, CategoryId};
use crate::domain::product::{Product, ProductDraft, ProductId};
use crate::errors::DomainError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("catalog backend unreachable: {0}")]
    Transport(String),
    #[error("catalog backend rejected credentials: {0}")]
    Auth(String),
    #[error("catalog backend returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode catalog response: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Validation(#[from] DomainError),
}

impl GatewayError {
    /// Short machine-readable class used in logs and command output.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Auth(_) => "auth",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation",
        }
    }
}

#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Products ordered by title, optionally restricted to one category name.
    async fn list_products(
        &self,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Product>, GatewayError>;

    /// Categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError>;

    /// Case-insensitive substring match over title and brand.
    async fn search_products(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Product>, GatewayError>;

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, GatewayError>;

    /// Products with a discount or the featured flag.
    async fn featured_products(&self, limit: usize) -> Result<Vec<Product>, GatewayError>;
}

#[async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, GatewayError>;
    async fn update_product(&self, product: Product) -> Result<Product, GatewayError>;
    async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError>;
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, GatewayError>;
    /// Edits name, description and image. Names stay unique ignoring case.
    async fn update_category(&self, category: Category) -> Result<Category, GatewayError>;
    /// Fails with [`GatewayError::Conflict`] while products still reference the category.
    async fn delete_category(&self, id: &CategoryId) -> Result<(), GatewayError>;
}
