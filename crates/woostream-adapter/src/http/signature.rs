/*
[INPUT]:  Shared credentials and request parameters
[OUTPUT]: Signed timestamps and x-api-* request headers
[POS]:    HTTP layer - request signing for authenticated endpoints
[UPDATE]: When changing signing algorithm or header format
*/

use std::fmt::Display;
use std::sync::Arc;

use reqwest::RequestBuilder;

use crate::auth::{Credentials, NO_PARAMS, sign, timestamp_millis};
use crate::http::Result;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const SIGNATURE_HEADER: &str = "x-api-signature";
pub const TIMESTAMP_HEADER: &str = "x-api-timestamp";

/// Timestamp and the signature computed over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub timestamp: String,
    pub signature: String,
}

/// Signs REST requests and WebSocket auth frames
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Arc<Credentials>,
}

impl RequestSigner {
    pub fn new(credentials: Arc<Credentials>) -> Self {
        Self { credentials }
    }

    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Sign the current timestamp with an empty parameter set.
    ///
    /// The timestamp is taken fresh on every call.
    pub fn sign_now(&self) -> Result<SignedRequest> {
        self.sign_params(timestamp_millis(), NO_PARAMS)
    }

    /// Sign `params` at a caller-supplied timestamp
    pub fn sign_params<I, K, V>(&self, timestamp: String, params: I) -> Result<SignedRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Display,
    {
        let signature = sign(&timestamp, self.credentials.api_secret(), params)?;
        Ok(SignedRequest {
            timestamp,
            signature,
        })
    }

    /// Attach `x-api-key`, `x-api-signature` and `x-api-timestamp` to a GET request.
    pub fn apply_headers(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let signed = self.sign_now()?;
        Ok(builder
            .header(API_KEY_HEADER, self.api_key())
            .header(SIGNATURE_HEADER, signed.signature)
            .header(TIMESTAMP_HEADER, signed.timestamp))
    }
}
