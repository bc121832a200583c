/*
[INPUT]:  WebSocket test scenarios
[OUTPUT]: Test results for stream sessions and merging
[POS]:    Integration tests - WebSocket
[UPDATE]: When session lifecycle or merging changes
*/

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{WsScript, spawn_ws_server, test_credentials};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use woostream_adapter::ws::EXECUTION_REPORT_TOPIC;
use woostream_adapter::{
    ConnectionState, Endpoints, ReconnectPolicy, ScriptedConnection, ScriptedConnector,
    StreamEvent, StreamKind, StreamMerger, StreamSession, TungsteniteConnector,
};

async fn next_event(session: &mut StreamSession) -> StreamEvent {
    tokio::time::timeout(Duration::from_secs(5), session.next_event())
        .await
        .expect("event within timeout")
}

#[tokio::test]
async fn test_session_over_real_websocket() {
    let fill = json!({
        "topic": "executionreport",
        "ts": 1,
        "data": {"symbol": "SPOT_BTC_USDT", "side": "BUY", "status": "FILLED",
                 "totalExecutedQuantity": 0.1, "avgPrice": 27000}
    });
    let second = json!({"topic": "executionreport", "ts": 2, "data": {"n": 2}});
    let (template, received) = spawn_ws_server(vec![
        WsScript::closing(&[json!({"event": "auth", "success": true}), fill.clone()]),
        WsScript::holding(&[json!({"event": "ping", "ts": 3}), second.clone()]),
    ])
    .await;

    let endpoints = Endpoints::new("http://127.0.0.1:1", &template, &template);
    let mut session = StreamSession::for_endpoint(
        &endpoints,
        StreamKind::Private,
        "app-id",
        EXECUTION_REPORT_TOPIC,
        test_credentials(),
        Arc::new(TungsteniteConnector::new()),
    )
    .with_reconnect_policy(ReconnectPolicy::immediate());
    assert!(session.url().ends_with("/v2/ws/private/stream/app-id"));

    let first = next_event(&mut session).await;
    assert_eq!(first.payload, fill);
    let report = first.execution_report().expect("execution report").unwrap();
    assert_eq!(report.symbol, "SPOT_BTC_USDT");

    // Server closed the first connection; the session comes back on a new one
    let event = next_event(&mut session).await;
    assert_eq!(event.payload, second);
    assert_eq!(session.state(), ConnectionState::Live);

    assert!(received.wait_for("ping", 1).await, "ping reply not received");
    assert_eq!(received.events("auth"), 2);
    assert_eq!(received.events("subscribe"), 2);
}

#[tokio::test]
async fn test_merged_sessions_tag_topics() {
    let positions = ScriptedConnector::new([ScriptedConnection::new()
        .frame(json!({"topic": "position", "data": {"positions": {}}}))
        .then_stall()]);
    let reports = ScriptedConnector::new([
        ScriptedConnection::new()
            .frame(json!({"topic": "executionreport", "data": {"n": 1}}))
            .error("socket reset"),
        ScriptedConnection::new()
            .frame(json!({"topic": "executionreport", "data": {"n": 2}}))
            .then_stall(),
    ]);

    let sessions = [("position", positions.clone()), ("executionreport", reports.clone())]
        .into_iter()
        .map(|(topic, connector)| {
            StreamSession::new("wss://unused", topic, test_credentials(), Arc::new(connector))
                .with_reconnect_policy(ReconnectPolicy::immediate())
                .into_stream()
        });
    let shutdown = CancellationToken::new();
    let mut merger = StreamMerger::new(sessions, shutdown.clone());

    let mut events = Vec::new();
    for _ in 0..3 {
        let event = tokio::time::timeout(Duration::from_secs(5), merger.next())
            .await
            .expect("merged event within timeout")
            .expect("merger open");
        events.push(event);
    }

    let report_numbers: Vec<_> = events
        .iter()
        .filter(|event| event.topic == "executionreport")
        .map(|event| event.payload["data"]["n"].clone())
        .collect();
    assert_eq!(report_numbers, vec![json!(1), json!(2)]);
    assert_eq!(events.iter().filter(|event| event.topic == "position").count(), 1);
    assert_eq!(reports.connect_calls(), 2);

    shutdown.cancel();
    let closed = tokio::time::timeout(Duration::from_secs(5), merger.next()).await;
    assert_eq!(closed.expect("merger closes after cancel"), None);
}
