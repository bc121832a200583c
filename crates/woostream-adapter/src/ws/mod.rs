/*
[INPUT]:  WebSocket endpoints, topics and credentials
[OUTPUT]: Auto-reconnecting stream sessions and their merged event sequence
[POS]:    WebSocket layer - real-time account streams
[UPDATE]: When adding new topics or changing connection logic
*/

pub mod backoff;
pub mod connector;
pub mod merge;
pub mod message;
pub mod scripted;
pub mod session;

pub use backoff::ReconnectPolicy;
pub use connector::{Connector, FrameSink, FrameStream, TungsteniteConnector};
pub use merge::{DEFAULT_MERGE_CAPACITY, StreamMerger};
pub use message::{
    EXECUTION_REPORT_TOPIC, ExecutionReportData, OutboundFrame, POSITION_TOPIC, StreamEvent,
};
pub use scripted::{ScriptedConnection, ScriptedConnector};
pub use session::{ConnectionState, StreamSession};
