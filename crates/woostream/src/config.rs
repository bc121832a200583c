/*
[INPUT]:  Optional YAML configuration file, CLI overrides
[OUTPUT]: Validated runtime configuration (network, credentials, topics, notifier, reconnect)
[POS]:    Configuration layer - startup settings
[UPDATE]: When adding new configuration options
*/

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use woostream_adapter::ws::{DEFAULT_MERGE_CAPACITY, EXECUTION_REPORT_TOPIC, POSITION_TOPIC};
use woostream_adapter::{Credentials, Network, ReconnectPolicy};

/// Settings read from the YAML file. Every field is optional; CLI flags fill gaps.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    pub network: Option<Network>,
    pub application_id: Option<String>,
    pub api_public_key: Option<String>,
    pub api_secret_key: Option<String>,
    pub topics: Vec<String>,
    pub telegram: Option<TelegramConfig>,
    pub reconnect: ReconnectConfig,
    pub merge_capacity: Option<usize>,
}

impl FileConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }
}

/// Values given on the command line; these win over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub network: Option<Network>,
    pub application_id: Option<String>,
    pub api_public_key: Option<String>,
    pub api_secret_key: Option<String>,
    pub topics: Vec<String>,
    pub telegram: Option<TelegramConfig>,
}

#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Reconnect pacing and idle limit for stream sessions, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub idle_timeout_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        let policy = ReconnectPolicy::default();
        Self {
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            idle_timeout_ms: policy.idle_timeout.as_millis() as u64,
        }
    }
}

impl ReconnectConfig {
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        )
        .with_idle_timeout(Duration::from_millis(self.idle_timeout_ms))
    }
}

/// Fully resolved configuration the runner starts from
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub network: Network,
    pub application_id: String,
    pub credentials: Arc<Credentials>,
    pub topics: Vec<String>,
    pub telegram: Option<TelegramConfig>,
    pub reconnect: ReconnectConfig,
    pub merge_capacity: usize,
}

impl AppConfig {
    /// Merge file and CLI values, CLI first, and check required fields
    pub fn resolve(file: FileConfig, cli: CliOverrides) -> Result<Self> {
        let network = cli.network.or(file.network).unwrap_or_default();
        let application_id = required("application id", cli.application_id, file.application_id)?;
        let api_public_key = required("api public key", cli.api_public_key, file.api_public_key)?;
        let api_secret_key = required("api secret key", cli.api_secret_key, file.api_secret_key)?;

        let mut topics = if !cli.topics.is_empty() {
            cli.topics
        } else if !file.topics.is_empty() {
            file.topics
        } else {
            default_topics()
        };
        let mut seen = std::collections::HashSet::new();
        topics.retain(|topic| seen.insert(topic.clone()));
        if topics.iter().any(|topic| topic.trim().is_empty()) {
            bail!("topic names must not be empty");
        }

        let telegram = cli.telegram.or(file.telegram);
        if let Some(telegram) = &telegram
            && (telegram.token.trim().is_empty() || telegram.chat_id.trim().is_empty())
        {
            bail!("telegram token and chat id must both be set");
        }

        let merge_capacity = file.merge_capacity.unwrap_or(DEFAULT_MERGE_CAPACITY);
        if merge_capacity == 0 {
            bail!("merge_capacity must be greater than zero");
        }
        if file.reconnect.idle_timeout_ms == 0 {
            bail!("reconnect.idle_timeout_ms must be greater than zero");
        }

        Ok(Self {
            network,
            application_id,
            credentials: Arc::new(Credentials::new(api_public_key, api_secret_key)),
            topics,
            telegram,
            reconnect: file.reconnect,
            merge_capacity,
        })
    }
}

pub fn default_topics() -> Vec<String> {
    vec![POSITION_TOPIC.to_string(), EXECUTION_REPORT_TOPIC.to_string()]
}

fn required(name: &str, cli: Option<String>, file: Option<String>) -> Result<String> {
    match cli.or(file) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("missing {name}"),
    }
}
