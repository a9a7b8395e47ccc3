use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::gateway::GatewayError;
use storefront_core::{
    format_currency, Catalog, Category, FilterSelection, PriceBucket, Product, ProductQuery,
    SortSelection, STORE_CURRENCY,
};

use crate::commands::{with_backend, CommandResult};

#[derive(Clone, Debug, Default)]
pub struct ProductsArgs {
    pub category: Option<String>,
    pub filter: FilterSelection,
    pub price_range: Option<PriceBucket>,
    pub sort: SortSelection,
    pub limit: Option<usize>,
}

/// Product as listed in command output, with the discounted price resolved.
#[derive(Debug, Serialize)]
pub(crate) struct ProductLine {
    id: String,
    title: String,
    brand: Option<String>,
    category: String,
    price: Decimal,
    discount: Decimal,
    final_price: Decimal,
    display_price: String,
    stock: u32,
}

impl From<&Product> for ProductLine {
    fn from(product: &Product) -> Self {
        let final_price = product.final_price();
        Self {
            id: product.id.0.clone(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            price: product.price,
            discount: product.discount_pct(),
            final_price,
            display_price: format_currency(final_price, STORE_CURRENCY),
            stock: product.stock,
        }
    }
}

#[derive(Debug, Serialize)]
struct CategoryLine {
    id: String,
    name: String,
    description: Option<String>,
    product_count: usize,
}

impl From<&Category> for CategoryLine {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.0.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
            product_count: category.product_count,
        }
    }
}

pub fn products(args: ProductsArgs) -> CommandResult {
    with_backend("products", |_config, reader| async move {
        let listed = reader.list_products(args.category.as_deref(), None).await?;
        let query =
            ProductQuery { filter: args.filter, price_range: args.price_range, sort: args.sort };

        let lines: Vec<ProductLine> = query
            .run(&listed)
            .iter()
            .take(args.limit.unwrap_or(usize::MAX))
            .map(ProductLine::from)
            .collect();

        let message = format!(
            "{} of {} products (filter={}, price_range={}, sort={})",
            lines.len(),
            listed.len(),
            query.filter,
            query.price_range.map_or_else(|| "any".to_string(), |bucket| bucket.to_string()),
            query.sort,
        );
        Ok::<_, GatewayError>(CommandResult::success_with_data("products", message, lines))
    })
}

pub fn categories() -> CommandResult {
    with_backend("categories", |_config, reader| async move {
        let products = reader.list_products(None, None).await?;
        let categories = reader.list_categories().await?;
        let catalog = Catalog::new(products, categories);

        let lines: Vec<CategoryLine> =
            catalog.categories().iter().map(CategoryLine::from).collect();
        let message = format!("{} categories", lines.len());
        Ok::<_, GatewayError>(CommandResult::success_with_data("categories", message, lines))
    })
}
