use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use storefront_cli::commands::catalog::{self, ProductsArgs};
use storefront_cli::commands::{config, doctor, search};
use storefront_core::{FilterSelection, PriceBucket, SortSelection};

#[test]
fn products_run_the_pipeline_over_the_memory_backend() {
    with_env(&[], || {
        let result = catalog::products(ProductsArgs {
            filter: FilterSelection::Discounts,
            sort: SortSelection::Discount,
            ..ProductsArgs::default()
        });
        assert_eq!(result.exit_code, 0, "expected products listing to succeed");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "products");
        assert_eq!(payload["status"], "ok");

        let discounts: Vec<f64> = payload["data"]
            .as_array()
            .expect("data should be an array")
            .iter()
            .map(|line| decimal(&line["discount"]))
            .collect();
        assert_eq!(discounts, [25.0, 20.0, 15.0, 12.0, 10.0, 5.0]);
    });
}

#[test]
fn products_price_range_uses_discounted_price() {
    with_env(&[], || {
        let result = catalog::products(ProductsArgs {
            price_range: Some(PriceBucket::Over1000),
            ..ProductsArgs::default()
        });
        let payload = parse_payload(&result.output);
        let lines = payload["data"].as_array().expect("data should be an array");

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["title"], "Refrigerador 11 pies");
        assert_eq!(lines[0]["display_price"], "$12,499.00 MXN");
    });
}

#[test]
fn products_respect_category_and_limit() {
    with_env(&[], || {
        let result = catalog::products(ProductsArgs {
            category: Some("LACTEOS".to_string()),
            sort: SortSelection::PriceAsc,
            limit: Some(2),
            ..ProductsArgs::default()
        });
        let payload = parse_payload(&result.output);
        let titles: Vec<&str> = payload["data"]
            .as_array()
            .expect("data should be an array")
            .iter()
            .filter_map(|line| line["title"].as_str())
            .collect();

        assert_eq!(titles, ["Leche Entera 1L", "Leche Deslactosada 1L"]);
    });
}

#[test]
fn categories_report_product_counts() {
    with_env(&[], || {
        let result = catalog::categories();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let lacteos = payload["data"]
            .as_array()
            .expect("data should be an array")
            .iter()
            .find(|line| line["name"] == "Lacteos")
            .cloned()
            .expect("lacteos should be listed");
        assert_eq!(lacteos["product_count"], 4);
    });
}

#[test]
fn search_matches_brand_case_insensitively() {
    with_env(&[], || {
        let result = search::search("  BIMBO ");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "search");
        assert_eq!(payload["data"].as_array().map(Vec::len), Some(2));
        assert!(payload["message"].as_str().unwrap_or_default().contains("`BIMBO`"));
    });
}

#[test]
fn suggest_returns_products_and_brands_with_targets() {
    with_env(&[], || {
        let result = search::suggest("le");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let lines = payload["data"].as_array().expect("data should be an array");
        let texts: Vec<(&str, &str)> = lines
            .iter()
            .filter_map(|line| Some((line["type"].as_str()?, line["text"].as_str()?)))
            .collect();
        assert_eq!(
            texts,
            [
                ("product", "Cloro 950ml"),
                ("brand", "Cloralex"),
                ("product", "Leche Deslactosada 1L"),
                ("product", "Leche Entera 1L"),
                ("brand", "LaLechera"),
            ]
        );

        assert_eq!(lines[1]["target"]["route"], "search");
        assert_eq!(lines[3]["target"]["route"], "product");
        assert_eq!(lines[3]["target"]["value"], "prod-leche-entera");
    });
}

#[test]
fn suggest_ignores_single_character_input() {
    with_env(&[], || {
        let payload = parse_payload(&search::suggest("l").output);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload.get("data"), Some(&Value::Array(Vec::new())));
    });
}

#[test]
fn rest_backend_without_url_is_a_config_failure() {
    with_env(&[("STOREFRONT_BACKEND_PROVIDER", "rest")], || {
        let result = catalog::categories();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn unreachable_backend_is_a_gateway_failure() {
    with_env(
        &[
            ("STOREFRONT_BACKEND_PROVIDER", "rest"),
            ("STOREFRONT_BACKEND_URL", "http://127.0.0.1:9"),
            ("STOREFRONT_BACKEND_API_KEY", "anon-test-key"),
            ("STOREFRONT_BACKEND_TIMEOUT_SECS", "2"),
        ],
        || {
            let result = search::search("leche");
            assert_eq!(result.exit_code, 3, "expected gateway failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "transport");
            assert!(payload["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
            assert!(payload["message"]
                .as_str()
                .unwrap_or_default()
                .starts_with("The catalog is temporarily unavailable"));
        },
    );
}

#[test]
fn config_output_attributes_sources_and_redacts_key() {
    with_env(
        &[
            ("STOREFRONT_BACKEND_PROVIDER", "rest"),
            ("STOREFRONT_BACKEND_URL", "https://shop.example.co"),
            ("STOREFRONT_BACKEND_API_KEY", "supersecretanonkey"),
        ],
        || {
            let output = config::run();
            assert!(output
                .contains("- backend.provider = rest (source: env (STOREFRONT_BACKEND_PROVIDER))"));
            assert!(output.contains("- search.debounce_ms = 300 (source: default)"));
            assert!(output.contains("- backend.api_key = supe***"));
            assert!(!output.contains("supersecretanonkey"));
        },
    );
}

#[test]
fn doctor_json_passes_with_memory_backend() {
    with_env(&[], || {
        let report = parse_payload(&doctor::run(true));
        assert_eq!(report["overall_status"], "pass");

        let names: Vec<&str> = report["checks"]
            .as_array()
            .expect("checks should be an array")
            .iter()
            .filter_map(|check| check["name"].as_str())
            .collect();
        assert_eq!(names, ["config_validation", "backend_connectivity"]);
    });
}

#[test]
fn doctor_reports_skipped_connectivity_on_bad_config() {
    with_env(&[("STOREFRONT_SEARCH_SUGGESTION_LIMIT", "0")], || {
        let output = doctor::run(false);
        assert!(output.starts_with("doctor: one or more readiness checks failed"));
        assert!(output.contains("- [skip] backend_connectivity"));
    });
}

fn decimal(value: &Value) -> f64 {
    value
        .as_str()
        .and_then(|text| text.parse::<f64>().ok())
        .or_else(|| value.as_f64())
        .expect("decimal field should be numeric")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STOREFRONT_BACKEND_PROVIDER",
        "STOREFRONT_BACKEND_URL",
        "STOREFRONT_BACKEND_API_KEY",
        "STOREFRONT_BACKEND_TIMEOUT_SECS",
        "STOREFRONT_SEARCH_DEBOUNCE_MS",
        "STOREFRONT_SEARCH_MIN_QUERY_CHARS",
        "STOREFRONT_SEARCH_SUGGESTION_LIMIT",
        "STOREFRONT_LOGGING_LEVEL",
        "STOREFRONT_LOGGING_FORMAT",
        "STOREFRONT_LOG_LEVEL",
        "STOREFRONT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
