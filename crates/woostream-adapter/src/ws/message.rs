/*
[INPUT]:  Outbound request parameters / raw inbound JSON frames
[OUTPUT]: Serialized auth/subscribe/ping frames, classified inbound frames, typed event data
[POS]:    WebSocket layer - message framing and parsing
[UPDATE]: When adding new message types or changing format
*/

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::Result;
use crate::types::{OrderStatus, Side};

pub const EXECUTION_REPORT_TOPIC: &str = "executionreport";
pub const POSITION_TOPIC: &str = "position";

const CORRELATION_TAG_BYTES: usize = 8;

/// Random URL-safe token attached to request frames
pub fn correlation_tag() -> String {
    let bytes: [u8; CORRELATION_TAG_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParams {
    pub apikey: String,
    pub sign: String,
    pub timestamp: String,
}

/// Frames sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum OutboundFrame {
    Auth { id: String, params: AuthParams },
    Subscribe { id: String, topic: String },
    Ping,
}

impl OutboundFrame {
    pub fn auth(api_key: &str, sign: String, timestamp: String) -> Self {
        OutboundFrame::Auth {
            id: correlation_tag(),
            params: AuthParams {
                apikey: api_key.to_string(),
                sign,
                timestamp,
            },
        }
    }

    pub fn subscribe(topic: &str) -> Self {
        OutboundFrame::Subscribe {
            id: correlation_tag(),
            topic: topic.to_string(),
        }
    }

    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Server keep-alive request
pub fn is_ping(frame: &Value) -> bool {
    frame.get("event").and_then(Value::as_str) == Some("ping")
}

/// Frames carrying an account data object are the only ones surfaced downstream.
/// Acks may carry a `data` key too, holding null or the topic name.
pub fn has_data(frame: &Value) -> bool {
    frame.get("data").is_some_and(Value::is_object)
}

/// One surfaced frame, tagged with the topic of the session that received it
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    pub topic: String,
    pub payload: Value,
}

impl StreamEvent {
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        self.payload.get("data")
    }

    /// Typed execution report, if this event came from the execution report topic
    pub fn execution_report(&self) -> Option<Result<ExecutionReportData>> {
        if self.topic != EXECUTION_REPORT_TOPIC {
            return None;
        }
        let data = self.data()?.clone();
        Some(serde_json::from_value(data).map_err(Into::into))
    }
}

/// Execution report data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReportData {
    pub symbol: String,
    pub side: Side,
    pub status: OrderStatus,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default, rename = "type")]
    pub order_type: Option<String>,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub executed_quantity: Decimal,
    #[serde(default)]
    pub executed_price: Decimal,
    #[serde(default)]
    pub total_executed_quantity: Decimal,
    #[serde(default)]
    pub avg_price: Decimal,
}
