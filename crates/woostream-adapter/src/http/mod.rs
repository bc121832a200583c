/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod private;
pub mod public;
pub mod signature;

pub use error::{Result, WooError};
pub use signature::{RequestSigner, SignedRequest};

pub use client::{ClientConfig, WooClient};
