/*
[INPUT]:  WebSocket URL
[OUTPUT]: Split text-frame sink/stream pair for one physical connection
[POS]:    WebSocket layer - transport seam between sessions and tokio-tungstenite
[UPDATE]: When changing connection options or frame handling
*/

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt, future};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::debug;

use crate::http::{Result, WooError};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound half of a connection, accepting text frames
pub type FrameSink = Pin<Box<dyn Sink<String, Error = WooError> + Send>>;

/// Inbound half of a connection, yielding text frames until the peer goes away
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Opens physical WebSocket connections.
///
/// Every call returns a brand-new connection; nothing is reused across calls.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream)>;
}

/// Connector backed by tokio-tungstenite
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    connect_timeout: Duration,
}

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TungsteniteConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream)> {
        let (ws_stream, response) = tokio::time::timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| WooError::Timeout {
                duration: self.connect_timeout.as_secs(),
            })?
            .map_err(ws_error)?;
        debug!(%url, status = response.status().as_u16(), "websocket handshake complete");

        let (write, read) = ws_stream.split();
        let sink = write
            .with(|text: String| future::ready(Ok::<_, WsError>(WsMessage::Text(text.into()))))
            .sink_map_err(ws_error);
        let stream = read.filter_map(|incoming| future::ready(text_frame(incoming)));

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

/// Protocol-level ping/pong is answered by tungstenite itself and never surfaces.
fn text_frame(incoming: std::result::Result<WsMessage, WsError>) -> Option<Result<String>> {
    match incoming {
        Ok(WsMessage::Text(text)) => Some(Ok(text.to_string())),
        Ok(WsMessage::Binary(bytes)) => Some(
            String::from_utf8(bytes.to_vec())
                .map_err(|err| WooError::WebSocket(format!("binary frame is not utf-8: {err}"))),
        ),
        Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) | Ok(WsMessage::Frame(_)) => None,
        Ok(WsMessage::Close(frame)) => {
            let reason = frame
                .map(|frame| format!("{} {}", frame.code, frame.reason))
                .unwrap_or_else(|| "no close frame".to_string());
            Some(Err(WooError::ConnectionClosed(reason)))
        }
        Err(err) => Some(Err(ws_error(err))),
    }
}

fn ws_error(err: WsError) -> WooError {
    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => {
            WooError::ConnectionClosed(err.to_string())
        }
        other => WooError::WebSocket(other.to_string()),
    }
}
