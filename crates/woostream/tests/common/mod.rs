/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared fixtures for woostream integration tests
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use woostream::{AppConfig, CliOverrides, FileConfig, ReconnectConfig};

pub const TELEGRAM_TOKEN: &str = "123:abc";
pub const TELEGRAM_PATH: &str = "/bot123:abc/sendMessage";

pub fn app_config(topics: &[&str]) -> AppConfig {
    let cli = CliOverrides {
        application_id: Some("app-id".to_string()),
        api_public_key: Some("key".to_string()),
        api_secret_key: Some("secret".to_string()),
        topics: topics.iter().map(ToString::to_string).collect(),
        ..CliOverrides::default()
    };
    let file = FileConfig {
        reconnect: ReconnectConfig {
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            ..ReconnectConfig::default()
        },
        ..FileConfig::default()
    };
    AppConfig::resolve(file, cli).expect("complete config")
}

pub async fn mount_json(server: &MockServer, endpoint: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Positions, holdings and symbol info for a small account
pub async fn mount_snapshot(server: &MockServer) {
    mount_json(
        server,
        "/v1/positions",
        200,
        json!({
            "success": true,
            "positions": [{"symbol": "PERP_BTC_USDT", "holding": 0.5, "average_open_price": 27000}]
        }),
    )
    .await;
    mount_json(
        server,
        "/v1/client/holding",
        200,
        json!({"success": true, "holding": {"USDT": 250.5}}),
    )
    .await;
    mount_json(
        server,
        "/v1/public/info",
        200,
        json!({"success": true, "rows": [{"symbol": "SPOT_USDC_USDT", "base_tick": 0.0001}]}),
    )
    .await;
}

pub async fn mount_telegram(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(TELEGRAM_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"ok": status == 200})))
        .mount(server)
        .await;
}

/// Texts posted to the mock Telegram endpoint so far
pub async fn telegram_texts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == TELEGRAM_PATH)
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter_map(|body| body["text"].as_str().map(ToString::to_string))
        .collect()
}

pub async fn wait_for_texts(server: &MockServer, count: usize) -> Vec<String> {
    for _ in 0..200 {
        let texts = telegram_texts(server).await;
        if texts.len() >= count {
            return texts;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    telegram_texts(server).await
}
