/*
[INPUT]:  API key pair and request parameters
[OUTPUT]: Credentials and HMAC request signatures
[POS]:    Auth layer - handles WOO X API authentication
[UPDATE]: When auth flow or signature methods change
*/

pub mod credentials;
pub mod signer;

pub use credentials::Credentials;
pub use signer::{NO_PARAMS, canonical_message, sign, timestamp_millis};
