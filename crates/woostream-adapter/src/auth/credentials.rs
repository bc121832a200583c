/*
[INPUT]:  API public key and secret key strings
[OUTPUT]: Credentials value with redacted Debug output
[POS]:    Auth layer - key material shared by REST and WebSocket clients
[UPDATE]: When adding credential sources or key formats
*/

use std::fmt;

/// WOO X API credentials.
///
/// The secret never appears in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: Box<[u8]>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into().into_bytes().into_boxed_slice(),
        }
    }

    /// Public API key, sent in `x-api-key` and the WS auth frame.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn api_secret(&self) -> &[u8] {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
