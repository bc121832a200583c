/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for woostream-adapter tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use wiremock::MockServer;
use woostream_adapter::{ClientConfig, Credentials, WooClient};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_API_SECRET: &str = "test-api-secret";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn test_credentials() -> Arc<Credentials> {
    Arc::new(Credentials::new(TEST_API_KEY, TEST_API_SECRET))
}

/// Client pointed at the mock server, with test credentials attached
pub fn authed_client(server: &MockServer) -> WooClient {
    WooClient::with_config(&server.uri(), ClientConfig::default())
        .expect("client builds")
        .with_credentials(test_credentials())
}

/// What the local WebSocket server does on one accepted connection
#[derive(Debug, Clone)]
pub struct WsScript {
    pub frames: Vec<String>,
    pub close_after: bool,
}

impl WsScript {
    pub fn closing(frames: &[serde_json::Value]) -> Self {
        Self {
            frames: frames.iter().map(ToString::to_string).collect(),
            close_after: true,
        }
    }

    pub fn holding(frames: &[serde_json::Value]) -> Self {
        Self {
            frames: frames.iter().map(ToString::to_string).collect(),
            close_after: false,
        }
    }
}

/// Text frames the local server received, across all connections
#[derive(Debug, Clone, Default)]
pub struct Received(Arc<Mutex<Vec<String>>>);

impl Received {
    fn push(&self, text: String) {
        self.0.lock().expect("received lock").push(text);
    }

    pub fn values(&self) -> Vec<serde_json::Value> {
        self.0
            .lock()
            .expect("received lock")
            .iter()
            .filter_map(|text| serde_json::from_str(text).ok())
            .collect()
    }

    pub fn events(&self, event: &str) -> usize {
        self.values()
            .iter()
            .filter(|value| value["event"] == event)
            .count()
    }

    /// Poll until `event` was received `count` times
    pub async fn wait_for(&self, event: &str, count: usize) -> bool {
        for _ in 0..200 {
            if self.events(event) >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

/// Plain `ws://` server playing one script per accepted connection.
///
/// Each connection first reads the client's auth and subscribe frames, then
/// sends its scripted frames.
pub async fn spawn_ws_server(scripts: Vec<WsScript>) -> (String, Received) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let received = Received::default();
    let mut scripts: VecDeque<WsScript> = scripts.into();

    let sink = received.clone();
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let Some(script) = scripts.pop_front() else {
                continue;
            };
            let received = sink.clone();
            tokio::spawn(async move {
                let mut ws = accept_async(tcp).await.expect("websocket handshake");
                for _ in 0..2 {
                    if let Some(Ok(Message::Text(text))) = ws.next().await {
                        received.push(text.to_string());
                    }
                }
                for frame in script.frames {
                    ws.send(Message::Text(frame.into())).await.expect("server send");
                }
                if script.close_after {
                    let _ = ws.close(None).await;
                    return;
                }
                while let Some(Ok(message)) = ws.next().await {
                    if let Message::Text(text) = message {
                        received.push(text.to_string());
                    }
                }
            });
        }
    });

    (format!("ws://{addr}/v2/ws/private/stream/{{application_id}}"), received)
}
