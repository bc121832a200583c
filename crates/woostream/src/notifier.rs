/*
[INPUT]:  Rendered notification text, optional Telegram bot settings
[OUTPUT]: Text on stdout, Telegram sendMessage deliveries
[POS]:    Output layer - notification sinks
[UPDATE]: When adding notification channels or changing delivery
*/

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::config::TelegramConfig;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Destination for human-readable notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Writes each notification to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn print(&self, text: &str) {
        println!("{text}");
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.print(text);
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram Bot API `sendMessage` client
#[derive(Clone)]
pub struct TelegramNotifier {
    http_client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(TELEGRAM_TIMEOUT)
            .build()
            .context("build telegram http client")?;
        Ok(Self {
            http_client,
            api_base: TELEGRAM_API_BASE.to_string(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    /// Point at another Bot API host (self-hosted server, tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
        };
        // Errors from reqwest carry the URL, which embeds the bot token.
        let response = self
            .http_client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|err| anyhow!("telegram request failed: {}", err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("telegram sendMessage returned {status}: {body}"));
        }
        debug!(chat_id = %self.chat_id, "telegram message delivered");
        Ok(())
    }
}

/// Prints every message and forwards it to the remote notifier, if any.
///
/// Remote deliveries run detached; a failed delivery is logged and dropped.
#[derive(Clone, Default)]
pub struct Broadcaster {
    console: ConsoleNotifier,
    remote: Option<Arc<dyn Notifier>>,
}

impl Broadcaster {
    pub fn new(remote: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            console: ConsoleNotifier,
            remote,
        }
    }

    pub fn from_config(telegram: Option<&TelegramConfig>) -> Result<Self> {
        let remote = match telegram {
            Some(config) => Some(Arc::new(TelegramNotifier::new(config)?) as Arc<dyn Notifier>),
            None => None,
        };
        Ok(Self::new(remote))
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Returns the delivery task so callers may wait on it; dropping it detaches.
    pub fn broadcast(&self, text: String) -> Option<JoinHandle<()>> {
        self.console.print(&text);
        let remote = self.remote.clone()?;
        Some(tokio::spawn(async move {
            if let Err(err) = remote.notify(&text).await {
                error!(error = %err, "notification delivery failed");
            }
        }))
    }
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("remote", &self.remote.is_some())
            .finish()
    }
}
