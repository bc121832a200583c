/*
[INPUT]:  Error sources (HTTP, API status, JSON decode, signing, WebSocket)
[OUTPUT]: Structured error types with transport/retry classification
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the WOO X adapter
#[derive(Error, Debug)]
pub enum WooError {
    /// HTTP transport failed (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("Request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    /// Payload was not valid JSON or did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket open/send/receive failed
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Peer closed the WebSocket or the stream ended
    #[error("WebSocket connection closed: {0}")]
    ConnectionClosed(String),

    /// Connection timeout
    #[error("Connection timeout after {duration}s")]
    Timeout { duration: u64 },

    /// Malformed input to the request signer
    #[error("Invalid signature input: {0}")]
    SignatureInput(String),

    /// Authenticated call on a client built without credentials
    #[error("Credentials required for authenticated request")]
    MissingCredentials,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WooError {
    /// Errors that end a stream connection and are recovered by reconnecting.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            WooError::WebSocket(_)
                | WooError::ConnectionClosed(_)
                | WooError::Timeout { .. }
                | WooError::Decode(_)
        )
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            WooError::Http(_) => true,
            WooError::Request { status, .. } => *status == 429 || *status >= 500,
            other => other.is_transport(),
        }
    }

    /// HTTP status for request errors
    pub fn status(&self) -> Option<u16> {
        match self {
            WooError::Request { status, .. } => Some(*status),
            WooError::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Create a request error from status code and response body
    pub fn request_error(status: StatusCode, body: impl Into<String>) -> Self {
        WooError::Request {
            status: status.as_u16(),
            body: body.into(),
        }
    }
}

/// Result type alias for WOO X operations
pub type Result<T> = std::result::Result<T, WooError>;
