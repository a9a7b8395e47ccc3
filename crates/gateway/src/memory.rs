use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use storefront_core::domain::category::{Category, CategoryDraft, CategoryId};
use storefront_core::domain::product::{Product, ProductDraft, ProductId};
use storefront_core::gateway::{CatalogReader, CatalogWriter, GatewayError};

use crate::fixtures::{demo_categories, demo_products};

/// Catalog backend held in process, with the same ordering and matching
/// rules as the hosted one.
#[derive(Default)]
pub struct InMemoryCatalogGateway {
    products: RwLock<HashMap<String, Product>>,
    categories: RwLock<HashMap<String, Category>>,
}

impl InMemoryCatalogGateway {
    pub fn with_catalog(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            products: RwLock::new(
                products.into_iter().map(|product| (product.id.0.clone(), product)).collect(),
            ),
            categories: RwLock::new(
                categories.into_iter().map(|category| (category.id.0.clone(), category)).collect(),
            ),
        }
    }

    pub fn demo() -> Self {
        Self::with_catalog(demo_products(), demo_categories())
    }

    async fn category_named(&self, name: &str) -> Option<Category> {
        let categories = self.categories.read().await;
        categories.values().find(|category| category.matches_name(name)).cloned()
    }

    async fn require_category(&self, name: &str) -> Result<Category, GatewayError> {
        self.category_named(name)
            .await
            .ok_or_else(|| GatewayError::NotFound(format!("category `{}`", name.trim())))
    }
}

fn by_title(mut products: Vec<Product>, limit: Option<usize>) -> Vec<Product> {
    products.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.0.cmp(&b.id.0)));
    products.truncate(limit.unwrap_or(usize::MAX));
    products
}

#[async_trait]
impl CatalogReader for InMemoryCatalogGateway {
    async fn list_products(
        &self,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Product>, GatewayError> {
        let wanted = match category {
            Some(name) => match self.category_named(name).await {
                Some(category) => Some(category),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let products = self.products.read().await;
        let listed = products
            .values()
            .filter(|product| wanted.as_ref().map_or(true, |c| c.matches_name(&product.category)))
            .cloned()
            .collect();
        Ok(by_title(listed, limit))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError> {
        let categories = self.categories.read().await;
        let mut listed: Vec<Category> = categories.values().cloned().collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn search_products(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Product>, GatewayError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let products = self.products.read().await;
        let hits =
            products.values().filter(|product| product.matches_text(text)).cloned().collect();
        Ok(by_title(hits, limit))
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, GatewayError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn featured_products(&self, limit: usize) -> Result<Vec<Product>, GatewayError> {
        let products = self.products.read().await;
        let featured = products
            .values()
            .filter(|product| product.on_discount() || product.is_featured())
            .cloned()
            .collect();
        Ok(by_title(featured, Some(limit)))
    }
}

#[async_trait]
impl CatalogWriter for InMemoryCatalogGateway {
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, GatewayError> {
        draft.validate()?;
        let category = self.require_category(&draft.category).await?;

        let mut product = draft.into_product(ProductId(Uuid::new_v4().to_string()), Utc::now());
        product.category = category.name;

        let mut products = self.products.write().await;
        products.insert(product.id.0.clone(), product.clone());
        info!(
            event_name = "catalog.product.created",
            product_id = %product.id,
            category = %product.category,
            "product created"
        );
        Ok(product)
    }

    async fn update_product(&self, mut product: Product) -> Result<Product, GatewayError> {
        product.validate()?;
        product.category = self.require_category(&product.category).await?.name;

        let mut products = self.products.write().await;
        let Some(existing) = products.get_mut(&product.id.0) else {
            return Err(GatewayError::NotFound(format!("product `{}`", product.id)));
        };
        if product.created_at.is_none() {
            product.created_at = existing.created_at;
        }
        *existing = product.clone();
        info!(event_name = "catalog.product.updated", product_id = %product.id, "product updated");
        Ok(product)
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError> {
        let mut products = self.products.write().await;
        if products.remove(&id.0).is_none() {
            return Err(GatewayError::NotFound(format!("product `{id}`")));
        }
        info!(event_name = "catalog.product.deleted", product_id = %id, "product deleted");
        Ok(())
    }

    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, GatewayError> {
        draft.validate()?;
        if self.category_named(&draft.name).await.is_some() {
            return Err(GatewayError::Conflict(format!(
                "category `{}` already exists",
                draft.name.trim()
            )));
        }

        let category = draft.into_category(CategoryId(Uuid::new_v4().to_string()));
        let mut categories = self.categories.write().await;
        categories.insert(category.id.0.clone(), category.clone());
        info!(
            event_name = "catalog.category.created",
            category = %category.name,
            "category created"
        );
        Ok(category)
    }

    async fn update_category(&self, mut category: Category) -> Result<Category, GatewayError> {
        category.validate()?;
        category.name = category.name.trim().to_string();
        category.product_count = 0;

        let mut products = self.products.write().await;
        let mut categories = self.categories.write().await;
        if categories
            .values()
            .any(|other| other.id != category.id && other.matches_name(&category.name))
        {
            return Err(GatewayError::Conflict(format!(
                "category `{}` already exists",
                category.name
            )));
        }
        let Some(existing) = categories.get_mut(&category.id.0) else {
            return Err(GatewayError::NotFound(format!("category `{}`", category.id)));
        };

        // products reference categories by name here
        for product in products.values_mut().filter(|p| existing.matches_name(&p.category)) {
            product.category = category.name.clone();
        }
        *existing = category.clone();
        info!(
            event_name = "catalog.category.updated",
            category_id = %category.id,
            category = %category.name,
            "category updated"
        );
        Ok(category)
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), GatewayError> {
        let products = self.products.read().await;
        let mut categories = self.categories.write().await;
        let Some(category) = categories.get(&id.0) else {
            return Err(GatewayError::NotFound(format!("category `{}`", id.0)));
        };

        let assigned =
            products.values().filter(|product| category.matches_name(&product.category)).count();
        if assigned > 0 {
            return Err(GatewayError::Conflict(format!(
                "category `{}` still has {assigned} product(s)",
                category.name
            )));
        }

        categories.remove(&id.0);
        info!(event_name = "catalog.category.deleted", category_id = %id.0, "category deleted");
        Ok(())
    }
}
