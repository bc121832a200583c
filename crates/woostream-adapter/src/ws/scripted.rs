/*
[INPUT]:  Per-connection scripts of inbound frames / failures
[OUTPUT]: In-memory Connector recording connect calls and outbound frames
[POS]:    WebSocket layer - deterministic transport for session tests
[UPDATE]: When sessions need new transport behaviours exercised
*/

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::{StreamExt, sink, stream};
use serde_json::Value;

use crate::http::{Result, WooError};
use crate::ws::connector::{Connector, FrameSink, FrameStream};

#[derive(Debug, Clone)]
enum ScriptStep {
    Frame(String),
    Error(String),
}

/// Script for one physical connection
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnection {
    refuse: bool,
    steps: Vec<ScriptStep>,
    stall: bool,
    sends_before_failure: Option<usize>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection attempt fails outright
    pub fn refused() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// Inbound JSON frame
    pub fn frame(mut self, frame: Value) -> Self {
        self.steps.push(ScriptStep::Frame(frame.to_string()));
        self
    }

    /// Inbound frame with arbitrary text, valid JSON or not
    pub fn raw(mut self, text: &str) -> Self {
        self.steps.push(ScriptStep::Frame(text.to_string()));
        self
    }

    /// Receive error after the frames queued so far
    pub fn error(mut self, message: &str) -> Self {
        self.steps.push(ScriptStep::Error(message.to_string()));
        self
    }

    /// Keep the connection open with no further frames once the script runs out
    pub fn then_stall(mut self) -> Self {
        self.stall = true;
        self
    }

    /// Outbound sends fail once `count` frames were accepted
    pub fn fail_sends_after(mut self, count: usize) -> Self {
        self.sends_before_failure = Some(count);
        self
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    connections: Mutex<VecDeque<ScriptedConnection>>,
    connect_calls: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

/// Connector that plays back scripted connections in order.
///
/// Once the scripts are used up, further connect calls never complete.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    state: Arc<ScriptState>,
}

impl ScriptedConnector {
    pub fn new(connections: impl IntoIterator<Item = ScriptedConnection>) -> Self {
        let state = ScriptState {
            connections: Mutex::new(connections.into_iter().collect()),
            ..ScriptState::default()
        };
        Self {
            state: Arc::new(state),
        }
    }

    pub fn connect_calls(&self) -> usize {
        self.state.connect_calls.load(Ordering::SeqCst)
    }

    /// Every frame accepted by any connection's sink, in send order
    pub fn sent_frames(&self) -> Vec<String> {
        self.state
            .sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Accepted frames that parse as JSON
    pub fn sent_values(&self) -> Vec<Value> {
        self.sent_frames()
            .iter()
            .filter_map(|text| serde_json::from_str(text).ok())
            .collect()
    }

    /// Accepted frames whose `event` field equals `event`
    pub fn sent_events(&self, event: &str) -> usize {
        self.sent_values()
            .iter()
            .filter(|value| value.get("event").and_then(Value::as_str) == Some(event))
            .count()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _url: &str) -> Result<(FrameSink, FrameStream)> {
        self.state.connect_calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .state
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let Some(script) = next else {
            return std::future::pending().await;
        };

        if script.refuse {
            return Err(WooError::WebSocket("connection refused".to_string()));
        }

        let state = self.state.clone();
        let budget = script.sends_before_failure;
        let frame_sink = sink::unfold(0usize, move |accepted, text: String| {
            let state = state.clone();
            async move {
                if budget.is_some_and(|limit| accepted >= limit) {
                    return Err(WooError::WebSocket("send failed".to_string()));
                }
                state
                    .sent
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(text);
                Ok(accepted + 1)
            }
        });

        let items = script.steps.into_iter().map(|step| match step {
            ScriptStep::Frame(text) => Ok(text),
            ScriptStep::Error(message) => Err(WooError::WebSocket(message)),
        });
        let frames = stream::iter(items);
        let frame_stream = if script.stall {
            frames.chain(stream::pending()).boxed()
        } else {
            frames.boxed()
        };

        Ok((Box::pin(frame_sink), frame_stream))
    }
}
