use std::env;
use std::fs;
use std::path::Path;

use secrecy::ExposeSecret;
use storefront_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let api_key = config
        .backend
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let entries = [
        (
            "backend.provider",
            config.backend.provider.to_string(),
            source("backend.provider", &["STOREFRONT_BACKEND_PROVIDER"]),
        ),
        (
            "backend.url",
            config.backend.url.clone().unwrap_or_else(|| "<unset>".to_string()),
            source("backend.url", &["STOREFRONT_BACKEND_URL"]),
        ),
        ("backend.api_key", api_key, source("backend.api_key", &["STOREFRONT_BACKEND_API_KEY"])),
        (
            "backend.timeout_secs",
            config.backend.timeout_secs.to_string(),
            source("backend.timeout_secs", &["STOREFRONT_BACKEND_TIMEOUT_SECS"]),
        ),
        (
            "search.debounce_ms",
            config.search.debounce_ms.to_string(),
            source("search.debounce_ms", &["STOREFRONT_SEARCH_DEBOUNCE_MS"]),
        ),
        (
            "search.min_query_chars",
            config.search.min_query_chars.to_string(),
            source("search.min_query_chars", &["STOREFRONT_SEARCH_MIN_QUERY_CHARS"]),
        ),
        (
            "search.suggestion_limit",
            config.search.suggestion_limit.to_string(),
            source("search.suggestion_limit", &["STOREFRONT_SEARCH_SUGGESTION_LIMIT"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            source("logging.format", &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"]),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.into_iter().map(|(key, value, source)| render_line(key, &value, source)));
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the first four characters so operators can tell keys apart.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    if trimmed.chars().count() <= 8 {
        return "<redacted>".to_string();
    }
    let prefix: String = trimmed.chars().take(4).collect();
    format!("{prefix}***")
}
