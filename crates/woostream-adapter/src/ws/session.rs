/*
[INPUT]:  Endpoint URL, topic, API credentials, Connector, ReconnectPolicy
[OUTPUT]: Endless sequence of topic-tagged data frames, connection state updates
[POS]:    WebSocket layer - per-topic connection lifecycle and reconnect loop
[UPDATE]: When changing the auth/subscribe handshake or reconnect behaviour
*/

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt, stream};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::auth::Credentials;
use crate::http::{RequestSigner, Result, WooError};
use crate::types::{Endpoints, StreamKind};
use crate::ws::backoff::ReconnectPolicy;
use crate::ws::connector::{Connector, FrameSink, FrameStream};
use crate::ws::message::{self, OutboundFrame, StreamEvent};

const PING_QUEUE_CAPACITY: usize = 8;

/// Lifecycle of a stream session, published through a watch channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Authenticating,
    Subscribing,
    Live,
    Reconnecting { attempt: u32 },
}

/// One logical subscription kept alive across any number of physical connections.
///
/// The session is lazy: nothing connects until the first [`StreamSession::next_event`].
/// There is no terminal state; transport and decode failures lead to a fresh
/// connection after the policy's backoff, and so does a live connection that
/// stays silent longer than the policy's idle timeout. Dropping the session closes the socket.
pub struct StreamSession {
    topic: String,
    url: String,
    signer: RequestSigner,
    connector: Arc<dyn Connector>,
    policy: ReconnectPolicy,
    state: watch::Sender<ConnectionState>,
    live: Option<LiveConnection>,
    failures: u32,
}

impl StreamSession {
    pub fn new(
        url: impl Into<String>,
        topic: impl Into<String>,
        credentials: Arc<Credentials>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            topic: topic.into(),
            url: url.into(),
            signer: RequestSigner::new(credentials),
            connector,
            policy: ReconnectPolicy::default(),
            state,
            live: None,
            failures: 0,
        }
    }

    /// Session against the private or public endpoint of `endpoints`
    pub fn for_endpoint(
        endpoints: &Endpoints,
        kind: StreamKind,
        application_id: &str,
        topic: impl Into<String>,
        credentials: Arc<Credentials>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self::new(
            endpoints.ws_url(kind, application_id),
            topic,
            credentials,
            connector,
        )
    }

    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Next frame carrying `data`. Never fails; reconnects as often as needed.
    pub async fn next_event(&mut self) -> StreamEvent {
        loop {
            if self.live.is_none() {
                match self.establish().await {
                    Ok(live) => {
                        self.live = Some(live);
                        self.failures = 0;
                        self.set_state(ConnectionState::Live);
                        info!(topic = %self.topic, "stream session live");
                    }
                    Err(err) => self.reconnect_after(err).await,
                }
                continue;
            }
            let Some(live) = self.live.as_mut() else {
                continue;
            };

            match live.next_event(&self.topic, self.policy.idle_timeout).await {
                Ok(event) => return event,
                Err(err) => {
                    self.live = None;
                    self.reconnect_after(err).await;
                }
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = StreamEvent> + Send {
        stream::unfold(self, |mut session| async move {
            let event = session.next_event().await;
            Some((event, session))
        })
    }

    /// Connect, then send auth and subscribe back to back. Acks are not awaited.
    async fn establish(&mut self) -> Result<LiveConnection> {
        self.set_state(ConnectionState::Connecting);
        let connector = self.connector.clone();
        let url = self.url.clone();
        let (mut sink, frames) = connector.connect(&url).await?;
        debug!(topic = %self.topic, %url, "websocket connected");

        self.set_state(ConnectionState::Authenticating);
        let signed = self.signer.sign_now()?;
        let auth = OutboundFrame::auth(self.signer.api_key(), signed.signature, signed.timestamp);
        sink.send(auth.to_text()?).await?;

        self.set_state(ConnectionState::Subscribing);
        let subscribe = OutboundFrame::subscribe(&self.topic);
        sink.send(subscribe.to_text()?).await?;
        debug!(topic = %self.topic, "auth and subscribe sent");

        Ok(LiveConnection::start(sink, frames, &self.topic))
    }

    async fn reconnect_after(&mut self, err: WooError) {
        self.failures = self.failures.saturating_add(1);
        let delay = self.policy.delay_for_attempt(self.failures);
        error!(
            topic = %self.topic,
            attempt = self.failures,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "stream session failed, reconnecting"
        );
        self.set_state(ConnectionState::Reconnecting {
            attempt: self.failures,
        });
        tokio::time::sleep(delay).await;
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            trace!(topic = %self.topic, ?previous, ?state, "stream session state");
        }
    }
}

impl fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("topic", &self.topic)
            .field("url", &self.url)
            .field("policy", &self.policy)
            .field("state", &self.state())
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

/// Aborts the ping writer together with the connection that owns it
struct WriterGuard(JoinHandle<()>);

impl Drop for WriterGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// One physical connection in the Live state
struct LiveConnection {
    frames: FrameStream,
    pings: mpsc::Sender<String>,
    _writer: WriterGuard,
}

impl LiveConnection {
    fn start(mut sink: FrameSink, frames: FrameStream, topic: &str) -> Self {
        let (pings, mut queued) = mpsc::channel::<String>(PING_QUEUE_CAPACITY);
        let topic = topic.to_string();
        let writer = tokio::spawn(async move {
            while let Some(text) = queued.recv().await {
                if let Err(err) = sink.send(text).await {
                    warn!(%topic, error = %err, "ping reply failed");
                }
            }
        });

        Self {
            frames,
            pings,
            _writer: WriterGuard(writer),
        }
    }

    /// Any inbound frame, pings included, resets the idle clock.
    async fn next_event(&mut self, topic: &str, idle_timeout: Duration) -> Result<StreamEvent> {
        loop {
            let next = tokio::time::timeout(idle_timeout, self.frames.next()).await;
            let text = match next {
                Err(_) => {
                    return Err(WooError::Timeout {
                        duration: idle_timeout.as_secs(),
                    });
                }
                Ok(Some(frame)) => frame?,
                Ok(None) => {
                    return Err(WooError::ConnectionClosed(
                        "stream ended by peer".to_string(),
                    ));
                }
            };
            let frame: Value = serde_json::from_str(&text)?;

            if message::is_ping(&frame) {
                self.reply_to_ping(topic);
                continue;
            }
            if message::has_data(&frame) {
                return Ok(StreamEvent::new(topic, frame));
            }
            if frame.get("success").and_then(Value::as_bool) == Some(false) {
                warn!(%topic, %frame, "request rejected by server");
            } else {
                trace!(%topic, %frame, "control frame dropped");
            }
        }
    }

    fn reply_to_ping(&self, topic: &str) {
        let reply = match OutboundFrame::Ping.to_text() {
            Ok(reply) => reply,
            Err(err) => {
                warn!(%topic, error = %err, "ping reply encode failed");
                return;
            }
        };
        if let Err(err) = self.pings.try_send(reply) {
            warn!(%topic, error = %err, "ping reply dropped");
        }
    }
}
