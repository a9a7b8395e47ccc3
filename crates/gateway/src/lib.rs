pub mod client;
pub mod fixtures;
pub mod memory;
pub mod rest;

use std::sync::Arc;

use storefront_core::config::{BackendConfig, BackendProvider};
use storefront_core::gateway::{CatalogReader, GatewayError};

pub use client::build_http_client;
pub use memory::InMemoryCatalogGateway;
pub use rest::RestCatalogGateway;

/// Reader for the configured backend provider.
pub fn open_reader(config: &BackendConfig) -> Result<Arc<dyn CatalogReader>, GatewayError> {
    match config.provider {
        BackendProvider::Memory => Ok(Arc::new(InMemoryCatalogGateway::demo())),
        BackendProvider::Rest => Ok(Arc::new(RestCatalogGateway::from_config(config)?)),
    }
}
