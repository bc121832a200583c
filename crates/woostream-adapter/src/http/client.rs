/*
[INPUT]:  HTTP configuration (base URL, timeouts, credentials)
[OUTPUT]: One-shot GET calls decoded as JSON, failures classified
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::auth::Credentials;
use crate::http::{RequestSigner, Result, WooError};
use crate::types::Endpoints;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// REST client for the WOO X API.
///
/// Every call is one-shot; retries are left to the caller.
#[derive(Debug, Clone)]
pub struct WooClient {
    http_client: Client,
    base_url: Url,
    signer: Option<RequestSigner>,
}

impl WooClient {
    /// Create a client for the given endpoint set with default configuration
    pub fn new(endpoints: &Endpoints) -> Result<Self> {
        Self::with_config(endpoints.http_base(), ClientConfig::default())
    }

    /// Create a client against an explicit base URL
    pub fn with_config(base_url: &str, config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            signer: None,
        })
    }

    /// Attach credentials for authenticated requests
    pub fn with_credentials(mut self, credentials: Arc<Credentials>) -> Self {
        self.signer = Some(RequestSigner::new(credentials));
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET `endpoint` and decode the body as JSON.
    ///
    /// Authenticated calls sign a fresh timestamp over an empty parameter set.
    pub async fn get(&self, endpoint: &str, authenticated: bool) -> Result<Value> {
        let mut builder = self.request(Method::GET, endpoint)?;
        if authenticated {
            let signer = self.signer.as_ref().ok_or(WooError::MissingCredentials)?;
            builder = signer.apply_headers(builder)?;
        }
        self.send_json(builder).await
    }

    /// GET `endpoint` and deserialize into `T`
    pub async fn get_as<T: DeserializeOwned>(&self, endpoint: &str, authenticated: bool) -> Result<T> {
        let value = self.get(endpoint, authenticated).await?;
        Ok(serde_json::from_value(value)?)
    }

    fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    async fn send_json(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "request rejected");
            return Err(WooError::request_error(status, body));
        }

        debug!(%url, bytes = body.len(), "request succeeded");
        Ok(serde_json::from_str(&body)?)
    }
}
