/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public WOO X adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;
pub mod ws;

// Re-export commonly used types from auth
pub use auth::{Credentials, NO_PARAMS, sign};

// Re-export commonly used types from http
pub use http::{ClientConfig, RequestSigner, Result, WooClient, WooError};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    ConnectionState,
    Connector,
    ReconnectPolicy,
    ScriptedConnection,
    ScriptedConnector,
    StreamEvent,
    StreamMerger,
    StreamSession,
    TungsteniteConnector,
};
