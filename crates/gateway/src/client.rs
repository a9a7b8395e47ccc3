use std::time::Duration;

use reqwest::Client;
use storefront_core::config::BackendConfig;
use storefront_core::gateway::GatewayError;

const USER_AGENT: &str = concat!("storefront/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client(config: &BackendConfig) -> Result<Client, GatewayError> {
    build_http_client_with_timeout(config.timeout_secs)
}

pub fn build_http_client_with_timeout(timeout_secs: u64) -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(timeout_secs.clamp(1, 10)))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|error| GatewayError::Transport(format!("could not build http client: {error}")))
}
