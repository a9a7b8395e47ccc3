//! PostgREST-style catalog backend.
//!
//! Tables live under `{base_url}/rest/v1/{table}`. Every request carries the
//! project key both as `apikey` and as a bearer token. Products embed their
//! category name through `select=*,categories(name)`.

use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use storefront_core::config::BackendConfig;
use storefront_core::domain::category::{Category, CategoryDraft, CategoryId};
use storefront_core::domain::product::{Product, ProductDraft, ProductId};
use storefront_core::gateway::{CatalogReader, CatalogWriter, GatewayError};

use crate::client::build_http_client;

const PRODUCTS: &str = "products";
const CATEGORIES: &str = "categories";
const PRODUCT_SELECT: &str = "*,categories(name)";

type Params = Vec<(&'static str, String)>;

pub struct RestCatalogGateway {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl RestCatalogGateway {
    pub fn new(client: Client, base_url: &str, api_key: SecretString) -> Self {
        Self { client, base_url: base_url.trim().trim_end_matches('/').to_string(), api_key }
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, GatewayError> {
        let base_url = config
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| GatewayError::Transport("backend.url is not configured".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GatewayError::Auth("backend.api_key is not configured".to_string()))?;

        Ok(Self::new(build_http_client(config)?, base_url, api_key))
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: Method, table: &str, params: &Params) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        self.client
            .request(method, self.table_url(table))
            .header("apikey", key)
            .bearer_auth(key)
            .query(params)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        table: &'static str,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let started = Instant::now();
        let response = request.send().await.map_err(|error| {
            warn!(
                event_name = "catalog.gateway.transport_failed",
                operation,
                table,
                error = %error,
                "catalog request did not complete"
            );
            GatewayError::Transport(error.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = status_error(status.as_u16(), &body);
            warn!(
                event_name = "catalog.gateway.rejected",
                operation,
                table,
                status = status.as_u16(),
                error_class = error.class(),
                "catalog request rejected"
            );
            return Err(error);
        }

        let body =
            response.bytes().await.map_err(|error| GatewayError::Transport(error.to_string()))?;
        let decoded = serde_json::from_slice::<T>(&body).map_err(|error| {
            warn!(
                event_name = "catalog.gateway.decode_failed",
                operation,
                table,
                error = %error,
                "catalog response did not match the expected shape"
            );
            GatewayError::Decode(error.to_string())
        })?;

        debug!(
            event_name = "catalog.gateway.request",
            operation,
            table,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog request completed"
        );
        Ok(decoded)
    }

    async fn fetch_products(
        &self,
        operation: &'static str,
        params: Params,
    ) -> Result<Vec<Product>, GatewayError> {
        let rows: Vec<ProductRow> =
            self.send(operation, PRODUCTS, self.request(Method::GET, PRODUCTS, &params)).await?;
        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    /// Category row whose name equals `name`, ignoring case.
    async fn find_category(&self, name: &str) -> Result<Option<CategoryRow>, GatewayError> {
        let params = vec![
            ("select", "*".to_string()),
            ("name", format!("ilike.{}", escape_like(name.trim()))),
        ];
        let rows: Vec<CategoryRow> = self
            .send("find_category", CATEGORIES, self.request(Method::GET, CATEGORIES, &params))
            .await?;
        // a `*` in the name widens the pattern, so rows are rechecked here
        Ok(rows.into_iter().find(|row| row.matches_name(name)))
    }

    async fn require_category(&self, name: &str) -> Result<CategoryRow, GatewayError> {
        self.find_category(name)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("category `{}`", name.trim())))
    }

    async fn write_product(
        &self,
        operation: &'static str,
        method: Method,
        mut params: Params,
        body: &ProductWrite<'_>,
    ) -> Result<Option<Product>, GatewayError> {
        params.push(("select", PRODUCT_SELECT.to_string()));
        let request = self
            .request(method, PRODUCTS, &params)
            .header("Prefer", "return=representation")
            .json(body);
        let rows: Vec<ProductRow> = self.send(operation, PRODUCTS, request).await?;
        Ok(rows.into_iter().next().map(ProductRow::into_product))
    }

    async fn write_category(
        &self,
        operation: &'static str,
        method: Method,
        params: Params,
        body: &CategoryWrite<'_>,
    ) -> Result<Option<Category>, GatewayError> {
        let request = self
            .request(method, CATEGORIES, &params)
            .header("Prefer", "return=representation")
            .json(body);
        let rows: Vec<CategoryRow> = self.send(operation, CATEGORIES, request).await?;
        Ok(rows.into_iter().next().map(CategoryRow::into_category))
    }

    async fn delete_rows(
        &self,
        operation: &'static str,
        table: &'static str,
        id: &str,
    ) -> Result<(), GatewayError> {
        let params = vec![("id", format!("eq.{id}")), ("select", "id".to_string())];
        let request =
            self.request(Method::DELETE, table, &params).header("Prefer", "return=representation");
        let deleted: Vec<IdRow> = self.send(operation, table, request).await?;
        if deleted.is_empty() {
            return Err(GatewayError::NotFound(format!("{table} `{id}`")));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for RestCatalogGateway {
    async fn list_products(
        &self,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Product>, GatewayError> {
        let category_id = match category {
            Some(name) => match self.find_category(name).await? {
                Some(row) => Some(id_text(&row.id)),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        self.fetch_products("list_products", product_list_params(category_id.as_deref(), limit))
            .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError> {
        let params = vec![("select", "*".to_string()), ("order", "name.asc".to_string())];
        let rows: Vec<CategoryRow> = self
            .send("list_categories", CATEGORIES, self.request(Method::GET, CATEGORIES, &params))
            .await?;
        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn search_products(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Product>, GatewayError> {
        let needle = text.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        if !needle.contains('*') {
            let params = product_search_params(needle, limit);
            return self.fetch_products("search_products", params).await;
        }

        // `*` can only be sent as a wildcard; keep the literal matches
        let mut hits =
            self.fetch_products("search_products", product_search_params(needle, None)).await?;
        hits.retain(|product| product.matches_text(needle));
        hits.truncate(limit.unwrap_or(usize::MAX));
        Ok(hits)
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, GatewayError> {
        let params = vec![
            ("select", PRODUCT_SELECT.to_string()),
            ("id", format!("eq.{}", id.0)),
            ("limit", "1".to_string()),
        ];
        Ok(self.fetch_products("get_product", params).await?.into_iter().next())
    }

    async fn featured_products(&self, limit: usize) -> Result<Vec<Product>, GatewayError> {
        self.fetch_products("featured_products", featured_params(limit)).await
    }
}

#[async_trait]
impl CatalogWriter for RestCatalogGateway {
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, GatewayError> {
        draft.validate()?;
        let category = self.require_category(&draft.category).await?;
        let body = ProductWrite {
            title: draft.title.trim(),
            brand: draft.brand.as_deref().map(str::trim).filter(|brand| !brand.is_empty()),
            category_id: &category.id,
            price: draft.price,
            discount: draft.discount,
            stock: draft.stock,
            image_url: draft.image.as_deref(),
            is_featured: draft.featured.unwrap_or(false),
        };
        self.write_product("create_product", Method::POST, Vec::new(), &body)
            .await?
            .ok_or_else(|| GatewayError::Decode("create_product returned no row".to_string()))
    }

    async fn update_product(&self, product: Product) -> Result<Product, GatewayError> {
        product.validate()?;
        let category = self.require_category(&product.category).await?;
        let body = ProductWrite {
            title: product.title.trim(),
            brand: product.brand.as_deref().map(str::trim).filter(|brand| !brand.is_empty()),
            category_id: &category.id,
            price: product.price,
            discount: product.discount,
            stock: product.stock,
            image_url: product.image.as_deref(),
            is_featured: product.featured.unwrap_or(false),
        };
        let params = vec![("id", format!("eq.{}", product.id.0))];
        self.write_product("update_product", Method::PATCH, params, &body)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("product `{}`", product.id)))
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError> {
        self.delete_rows("delete_product", PRODUCTS, &id.0).await
    }

    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, GatewayError> {
        draft.validate()?;
        if self.find_category(&draft.name).await?.is_some() {
            return Err(GatewayError::Conflict(format!(
                "category `{}` already exists",
                draft.name.trim()
            )));
        }

        let body = CategoryWrite {
            name: draft.name.trim(),
            description: draft.description.as_deref(),
            image_url: draft.image.as_deref(),
        };
        self.write_category("create_category", Method::POST, Vec::new(), &body)
            .await?
            .ok_or_else(|| GatewayError::Decode("create_category returned no row".to_string()))
    }

    async fn update_category(&self, category: Category) -> Result<Category, GatewayError> {
        category.validate()?;
        if let Some(existing) = self.find_category(&category.name).await? {
            if id_text(&existing.id) != category.id.0 {
                return Err(GatewayError::Conflict(format!(
                    "category `{}` already exists",
                    category.name.trim()
                )));
            }
        }

        let body = CategoryWrite {
            name: category.name.trim(),
            description: category.description.as_deref(),
            image_url: category.image.as_deref(),
        };
        let params = vec![("id", format!("eq.{}", category.id.0))];
        self.write_category("update_category", Method::PATCH, params, &body)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("category `{}`", category.id)))
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), GatewayError> {
        let params = vec![("select", "id".to_string()), ("category_id", format!("eq.{}", id.0))];
        let referencing: Vec<IdRow> = self
            .send("delete_category", PRODUCTS, self.request(Method::GET, PRODUCTS, &params))
            .await?;
        if !referencing.is_empty() {
            return Err(GatewayError::Conflict(format!(
                "category `{}` still has {} product(s)",
                id.0,
                referencing.len()
            )));
        }

        self.delete_rows("delete_category", CATEGORIES, &id.0).await
    }
}

pub fn product_list_params(category_id: Option<&str>, limit: Option<usize>) -> Params {
    let mut params = vec![("select", PRODUCT_SELECT.to_string())];
    if let Some(category_id) = category_id {
        params.push(("category_id", format!("eq.{category_id}")));
    }
    params.push(("order", "title.asc".to_string()));
    if let Some(limit) = limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

/// Case-insensitive substring match on title or brand.
pub fn product_search_params(text: &str, limit: Option<usize>) -> Params {
    let pattern = quote_filter_value(&format!("*{}*", escape_like(text.trim())));
    let mut params = vec![
        ("select", PRODUCT_SELECT.to_string()),
        ("or", format!("(title.ilike.{pattern},brand.ilike.{pattern})")),
        ("order", "title.asc".to_string()),
    ];
    if let Some(limit) = limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

pub fn featured_params(limit: usize) -> Params {
    vec![
        ("select", PRODUCT_SELECT.to_string()),
        ("or", "(discount.gt.0,is_featured.eq.true)".to_string()),
        ("order", "title.asc".to_string()),
        ("limit", limit.to_string()),
    ]
}

pub fn status_error(status: u16, body: &str) -> GatewayError {
    let message = error_message(body);
    match status {
        401 | 403 => GatewayError::Auth(message),
        _ => GatewayError::Status { status, message },
    }
}

/// PostgREST errors carry a `message` field; anything else is passed through.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// PostgREST reads `*` as `%` and has no escape for it, so it is sent as the
/// single-character wildcard and callers recheck rows locally.
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_").replace('*', "_")
}

/// Double-quotes a value so commas and parentheses survive inside `or=(...)`.
fn quote_filter_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: Value,
}

#[derive(Debug, Deserialize)]
struct CategoryName {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRow {
    id: Value,
    title: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    categories: Option<CategoryName>,
    #[serde(deserialize_with = "decimal_from_wire")]
    price: Decimal,
    #[serde(default, deserialize_with = "optional_decimal_from_wire")]
    discount: Option<Decimal>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_featured: Option<bool>,
    #[serde(default, deserialize_with = "optional_decimal_from_wire")]
    rating: Option<Decimal>,
}

impl ProductRow {
    pub fn into_product(self) -> Product {
        Product {
            id: ProductId(id_text(&self.id)),
            title: self.title,
            brand: self.brand,
            category: self.categories.and_then(|category| category.name).unwrap_or_default(),
            price: self.price,
            discount: self.discount,
            stock: self.stock.map_or(0, |stock| stock.clamp(0, i64::from(u32::MAX)) as u32),
            image: self.image_url,
            created_at: self.created_at,
            featured: self.is_featured,
            rating: self.rating,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryRow {
    id: Value,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

impl CategoryRow {
    fn matches_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }

    pub fn into_category(self) -> Category {
        Category {
            id: CategoryId(id_text(&self.id)),
            name: self.name,
            description: self.description,
            image: self.image_url,
            product_count: 0,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProductWrite<'a> {
    title: &'a str,
    brand: Option<&'a str>,
    category_id: &'a Value,
    price: Decimal,
    discount: Option<Decimal>,
    stock: u32,
    image_url: Option<&'a str>,
    is_featured: bool,
}

#[derive(Debug, Serialize)]
struct CategoryWrite<'a> {
    name: &'a str,
    description: Option<&'a str>,
    image_url: Option<&'a str>,
}

/// `numeric` columns arrive as JSON numbers or strings depending on the client.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Number(serde_json::Number),
    Text(String),
}

impl WireNumber {
    fn into_decimal<E: serde::de::Error>(self) -> Result<Decimal, E> {
        let text = match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        };
        Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map_err(|_| E::custom(format!("invalid decimal `{text}`")))
    }
}

fn decimal_from_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    WireNumber::deserialize(deserializer)?.into_decimal()
}

fn optional_decimal_from_wire<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
    Option::<WireNumber>::deserialize(deserializer)?.map(WireNumber::into_decimal).transpose()
}
