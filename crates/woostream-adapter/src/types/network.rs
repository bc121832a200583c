/*
[INPUT]:  Network selector string and application id
[OUTPUT]: Resolved REST base URL and WebSocket endpoint URLs
[POS]:    Data layer - per-environment endpoint table
[UPDATE]: When WOO X moves endpoints or a new environment is added
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::http::WooError;

const APPLICATION_ID_PLACEHOLDER: &str = "{application_id}";

const MAINNET_HTTP: &str = "https://api.woo.org";
const MAINNET_WS_PUBLIC: &str = "wss://wss.woo.org/ws/stream/{application_id}";
const MAINNET_WS_PRIVATE: &str = "wss://wss.woo.org/v2/ws/private/stream/{application_id}";

const TESTNET_HTTP: &str = "https://api.staging.woo.org";
const TESTNET_WS_PUBLIC: &str = "wss://wss.staging.woo.org/ws/stream/{application_id}";
const TESTNET_WS_PRIVATE: &str =
    "wss://wss.staging.woo.org/v2/ws/private/stream/{application_id}";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = WooError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(WooError::Config(format!(
                "unknown network '{other}', expected mainnet or testnet"
            ))),
        }
    }
}

/// Which WebSocket feed a session connects to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Public,
    #[default]
    Private,
}

/// Endpoint set for one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    http_base: String,
    ws_public: String,
    ws_private: String,
}

impl Endpoints {
    /// Explicit endpoints. WebSocket templates may contain `{application_id}`.
    pub fn new(
        http_base: impl Into<String>,
        ws_public: impl Into<String>,
        ws_private: impl Into<String>,
    ) -> Self {
        Self {
            http_base: http_base.into(),
            ws_public: ws_public.into(),
            ws_private: ws_private.into(),
        }
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::new(MAINNET_HTTP, MAINNET_WS_PUBLIC, MAINNET_WS_PRIVATE),
            Network::Testnet => Self::new(TESTNET_HTTP, TESTNET_WS_PUBLIC, TESTNET_WS_PRIVATE),
        }
    }

    pub fn http_base(&self) -> &str {
        &self.http_base
    }

    /// WebSocket URL for `kind`, templated with the application id
    pub fn ws_url(&self, kind: StreamKind, application_id: &str) -> String {
        let template = match kind {
            StreamKind::Public => &self.ws_public,
            StreamKind::Private => &self.ws_private,
        };
        template.replace(APPLICATION_ID_PLACEHOLDER, application_id)
    }
}

impl From<Network> for Endpoints {
    fn from(network: Network) -> Self {
        Self::for_network(network)
    }
}
