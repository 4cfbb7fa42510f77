//! HTTP integration tests against a mock agent service.

use agentwire_client::{AgentClient, AgentEvent, Checkpoint, Error, RunInput};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TENANT: &str = "f436cc35-e7af-411d-b4b0-63d3ee183523";

fn client_for(server: &MockServer) -> AgentClient {
    AgentClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn sse(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

// ─────────────────────────────────────────────────────────────────────────────
// Streaming
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stream_run_posts_input_and_yields_events() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent"))
        .and(header("x-tenant-id", TENANT))
        .and(body_json(json!({
            "type": "run",
            "thread_id": "t1",
            "state": {"city": "Oslo"}
        })))
        .respond_with(sse(
            "event: checkpoint\ndata: {\"state\":{\"city\":\"Oslo\"}}\n\n\
             event: message_chunk\ndata: {\"content\":\"Sunny\"}\n\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input: RunInput = RunInput::run("t1", json!({"city": "Oslo"}));
    let events = client
        .stream_run(&input)
        .await
        .unwrap()
        .collect_events()
        .await
        .unwrap();

    assert_eq!(
        events,
        vec![
            AgentEvent::new("checkpoint", json!({"state": {"city": "Oslo"}})),
            AgentEvent::new("message_chunk", json!({"content": "Sunny"})),
        ]
    );
}

#[tokio::test]
async fn test_stream_resume_and_replay_shapes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent"))
        .and(body_json(json!({"type": "resume", "thread_id": "t2", "resume": "approve"})))
        .respond_with(sse("event: token\ndata: {\"value\":\"hi\"}\n\n"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/agent"))
        .and(body_json(json!({"type": "replay", "thread_id": "t2", "checkpoint_id": "cp-1"})))
        .respond_with(sse("event: end\n\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let events = client
        .runs()
        .resume("t2", "approve")
        .await
        .unwrap()
        .collect_events()
        .await
        .unwrap();
    assert_eq!(events, vec![AgentEvent::new("token", json!({"value": "hi"}))]);

    let events = client
        .runs()
        .replay("t2", "cp-1")
        .await
        .unwrap()
        .collect_events()
        .await
        .unwrap();
    assert_eq!(events, vec![AgentEvent::new("end", serde_json::Value::Null)]);
}

#[tokio::test]
async fn test_stream_fork_uses_custom_route() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/agent"))
        .and(body_json(json!({
            "type": "fork",
            "thread_id": "t3",
            "checkpoint_id": "cp-9",
            "state": {"n": 1},
            "agent": "weather"
        })))
        .respond_with(sse("data: {\"ok\":true}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AgentClient::builder()
        .base_url(server.uri())
        .dispatch_route("api/agent")
        .build()
        .unwrap();

    let input: RunInput = RunInput::fork("t3", "cp-9", json!({"n": 1})).with_agent("weather");
    let events = client
        .stream_run(&input)
        .await
        .unwrap()
        .collect_events()
        .await
        .unwrap();

    assert_eq!(events, vec![AgentEvent::new("message", json!({"ok": true}))]);
}

#[tokio::test]
async fn test_stream_request_error_carries_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"detail": "thread is busy"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input: RunInput = RunInput::run("t1", json!({}));
    let err = client.stream_run(&input).await.unwrap_err();

    assert!(matches!(err, Error::Request { status: 409, .. }));
    assert_eq!(err.to_string(), "thread is busy");
}

#[tokio::test]
async fn test_stream_request_error_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input: RunInput = RunInput::run("t1", json!({}));
    let err = client.stream_run(&input).await.unwrap_err();

    assert!(err.is_server_error());
    assert_eq!(err.to_string(), "Failed to call agent route");
}

#[tokio::test]
async fn test_stream_malformed_payload_keeps_earlier_events() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent"))
        .respond_with(sse(
            "event: a\ndata: {\"n\":1}\n\nevent: b\ndata: {broken\n\nevent: c\ndata: 3\n\n",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input: RunInput = RunInput::run("t1", json!({}));
    let mut stream = client.stream_run(&input).await.unwrap();

    let first = stream.next_event().await.unwrap().unwrap();
    assert_eq!(first, AgentEvent::new("a", json!({"n": 1})));

    let err = stream.next_event().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(stream.next_event().await.is_none());
}

#[tokio::test]
async fn test_stream_cancel_mid_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent"))
        .respond_with(sse("event: a\ndata: 1\n\nevent: b\ndata: 2\n\n"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input: RunInput = RunInput::run("t1", json!({}));
    let mut stream = client.stream_run(&input).await.unwrap();

    assert_eq!(stream.next_event().await.unwrap().unwrap().event, "a");
    stream.cancel();

    // The client stays usable after a cancelled stream.
    let events = client
        .stream_run(&input)
        .await
        .unwrap()
        .collect_events()
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_history_preserves_server_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .and(query_param("thread_id", "t1"))
        .and(header("x-tenant-id", TENANT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"thread_id": "t1", "checkpoint_id": "c3", "state": {"step": 3}},
            {"thread_id": "t1", "checkpoint_id": "c1", "state": {"step": 1}},
            {"thread_id": "t1", "checkpoint_id": "c1", "state": {"step": 1}},
            {"thread_id": "t1", "checkpoint_id": "c2", "state": {"step": 2},
             "interrupt_value": {"question": "ok?"}}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let history: Vec<Checkpoint> = client.get_history("t1").await.unwrap();

    let ids: Vec<_> = history
        .iter()
        .map(|c| c.checkpoint_id.as_deref().unwrap())
        .collect();
    assert_eq!(ids, vec!["c3", "c1", "c1", "c2"]);
    assert!(history[3].is_interrupted());
    assert_eq!(history[0].state, json!({"step": 3}));
}

#[tokio::test]
async fn test_history_typed_state() {
    #[derive(Debug, serde::Deserialize)]
    struct Step {
        step: u32,
    }

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"thread_id": "t1", "state": {"step": 7}, "interrupt_value": "continue?"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let history = client.control().history::<Step, String>("t1").await.unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].state.step, 7);
    assert_eq!(history[0].interrupt_value.as_deref(), Some("continue?"));
}

#[tokio::test]
async fn test_history_error_carries_detail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "unknown thread"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_history::<serde_json::Value, serde_json::Value>("missing")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HistoryFetch { status: 404, .. }));
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "unknown thread");
}

#[tokio::test]
async fn test_history_error_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_history::<serde_json::Value, serde_json::Value>("t1")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch agent history");
}

#[tokio::test]
async fn test_history_invalid_body_is_json_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_history::<serde_json::Value, serde_json::Value>("t1")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Json(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Stop
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stop_posts_thread_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent/stop"))
        .and(header("x-tenant-id", TENANT))
        .and(body_json(json!({"thread_id": "x"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.stop_agent("x").await.unwrap();
}

#[tokio::test]
async fn test_stop_not_found_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent/stop"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "not found"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.stop_agent("x").await.unwrap_err();

    match &err {
        Error::Stop { status, detail } => {
            assert_eq!(*status, 404);
            assert_eq!(detail, "not found");
        }
        other => panic!("expected stop error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "not found");
}

#[tokio::test]
async fn test_stop_fallback_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent/stop"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.stop_agent("x").await.unwrap_err();

    assert!(matches!(err, Error::Stop { status: 500, .. }));
    assert_eq!(err.to_string(), "Failed to stop agent");
}

#[tokio::test]
async fn test_custom_tenant_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent/stop"))
        .and(header("x-tenant-id", "tenant-42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = AgentClient::builder()
        .base_url(server.uri())
        .tenant_id("tenant-42")
        .build()
        .unwrap();
    client.stop_agent("x").await.unwrap();
}
