pub mod collation;
pub mod pipeline;
pub mod pricing;

use crate::domain::category::Category;
use crate::domain::product::{Product, ProductId};

use self::pipeline::ProductQuery;

/// Read-only snapshot of the products and categories a view works from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        let categories =
            categories.into_iter().map(|category| category.with_product_count(&products)).collect();
        Self { products, categories }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty()
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn view(&self, query: &ProductQuery) -> Vec<Product> {
        query.run(&self.products)
    }

    /// Products on discount or flagged as featured, in catalog order.
    pub fn featured(&self, limit: usize) -> Vec<Product> {
        self.products
            .iter()
            .filter(|product| product.on_discount() || product.is_featured())
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn by_category(&self, category_name: &str, limit: usize) -> Vec<Product> {
        let wanted = category_name.trim().to_lowercase();
        self.products
            .iter()
            .filter(|product| product.category.trim().to_lowercase() == wanted)
            .take(limit)
            .cloned()
            .collect()
    }

    pub(crate) fn with_products(&self, products: Vec<Product>) -> Self {
        Self::new(products, self.categories.clone())
    }

    pub(crate) fn with_categories(&self, categories: Vec<Category>) -> Self {
        Self::new(self.products.clone(), categories)
    }
}
