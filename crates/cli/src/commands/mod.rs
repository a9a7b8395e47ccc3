pub mod catalog;
pub mod config;
pub mod doctor;
pub mod search;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::errors::ApplicationError;
use storefront_core::gateway::{CatalogReader, GatewayError};
use tracing::warn;
use uuid::Uuid;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_GATEWAY: u8 = 3;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, Value::Null)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn config_failure(command: &str, error: impl std::fmt::Display) -> Self {
        Self::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    }

    /// Gateway failures carry a correlation id that also appears in the logs.
    pub fn gateway_failure(command: &str, error: GatewayError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        let error_class = error.class();
        let detail = error.to_string();
        let interface = ApplicationError::from(error).into_interface(correlation_id.clone());
        warn!(
            event_name = "cli.command.gateway_failed",
            command,
            error_class,
            correlation_id = %correlation_id,
            error = %detail,
            "catalog backend call failed"
        );

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: format!("{} ({detail})", interface.user_message()),
            correlation_id: Some(interface.correlation_id().to_string()),
            data: None,
        };
        Self { exit_code: EXIT_GATEWAY, output: serialize_payload(payload) }
    }
}

/// Loads config, opens the configured backend and runs `operation` on a
/// single-threaded runtime.
pub(crate) fn with_backend<F, Fut>(command: &str, operation: F) -> CommandResult
where
    F: FnOnce(AppConfig, Arc<dyn CatalogReader>) -> Fut,
    Fut: Future<Output = Result<CommandResult, GatewayError>>,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure(command, error),
    };

    let reader = match storefront_gateway::open_reader(&config.backend) {
        Ok(reader) => reader,
        Err(error) => return CommandResult::gateway_failure(command, error),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    match runtime.block_on(operation(config, reader)) {
        Ok(result) => result,
        Err(error) => CommandResult::gateway_failure(command, error),
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
