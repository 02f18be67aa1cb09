//! Registry discovery and the HTTP transport, against wiremock agents.

mod common;

use common::mocks::FixedSelector;
use futures::StreamExt;
use relay::a2a::{A2AClient, RemoteAgentClient, build_http_client};
use relay::agents::AgentRegistry;
use relay::relay::{AgentQueryService, RelayOptions, build_envelope};
use relay::types::{Query, RegistrationError, StreamEvent, TransportError};
use relay::utils::toml_config::RemoteAgentConfig;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CARD_PATH: &str = "/.well-known/agent.json";

fn registry() -> Arc<AgentRegistry> {
    Arc::new(AgentRegistry::new(reqwest::Client::new(), CARD_PATH))
}

async fn agent_server(name: &str, description: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CARD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": name,
            "description": description,
            "url": "http://0.0.0.0:10050/",
            "version": "1.0.0",
            "capabilities": {"streaming": true, "pushNotifications": false},
            "defaultInputModes": ["text"],
            "defaultOutputModes": ["text"],
            "skills": [{"id": "chat", "name": "Chat", "description": "General chat", "tags": ["chat"]}]
        })))
        .mount(&server)
        .await;
    server
}

fn endpoint(server: &MockServer, description: &str) -> RemoteAgentConfig {
    RemoteAgentConfig {
        host: server.address().ip().to_string(),
        port: server.address().port(),
        description: description.to_string(),
        scheme: "http".to_string(),
    }
}

fn sse_body(frames: &[serde_json::Value]) -> String {
    frames
        .iter()
        .map(|frame| format!("data: {}\n\n", frame))
        .collect()
}

// ============= Registration =============

#[tokio::test]
async fn test_register_fetches_card() {
    let server = agent_server("Chat Agent", "An Agent for other chatting").await;
    let registry = registry();

    let descriptor = registry.register(&server.uri()).await.unwrap();

    assert_eq!(descriptor.name, "Chat Agent");
    assert_eq!(descriptor.description, "An Agent for other chatting");
    // The card advertises 0.0.0.0; the registration URL is what gets used
    assert_eq!(descriptor.endpoint_url, server.uri());

    let listed = registry.list_available();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].url, server.uri());
    assert_eq!(
        registry.client_for("Chat Agent").unwrap().url(),
        server.uri()
    );
    assert!(registry.agents()[0].streaming);
}

#[tokio::test]
async fn test_register_missing_card_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CARD_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let registry = registry();
    let err = registry.register(&server.uri()).await.unwrap_err();

    assert!(matches!(err, RegistrationError::Unreachable { .. }));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_register_garbage_card_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CARD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
        .mount(&server)
        .await;

    let err = registry().register(&server.uri()).await.unwrap_err();
    assert!(matches!(err, RegistrationError::MalformedDescriptor { .. }));
}

#[tokio::test]
async fn test_register_nameless_card_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CARD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "  "})))
        .mount(&server)
        .await;

    let err = registry().register(&server.uri()).await.unwrap_err();
    assert!(matches!(err, RegistrationError::MalformedDescriptor { .. }));
}

#[tokio::test]
async fn test_register_closed_port_is_unreachable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let err = registry().register(&uri).await.unwrap_err();
    assert!(matches!(err, RegistrationError::Unreachable { .. }));
}

#[tokio::test]
async fn test_discover_tolerates_partial_failure() {
    let coding = agent_server("Coding Agent", "An Agent for Coding").await;
    let chat = agent_server("Chat Agent", "").await;
    let down = MockServer::start().await;

    let mut endpoints = BTreeMap::new();
    endpoints.insert("chat_agent".to_string(), endpoint(&chat, "An Agent for other chatting"));
    endpoints.insert("coding_agent".to_string(), endpoint(&coding, "ignored"));
    endpoints.insert("sql_agent".to_string(), endpoint(&down, "SQL"));

    let registry = registry();
    let report = registry.discover(&endpoints).await;

    assert_eq!(report.registered.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(!report.is_complete());

    let listed = registry.list_available();
    let names: Vec<_> = listed.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Chat Agent", "Coding Agent"]);

    // Empty card descriptions fall back to the configured one
    assert_eq!(listed[0].description, "An Agent for other chatting");
    assert_eq!(listed[1].description, "An Agent for Coding");
}

#[tokio::test]
async fn test_duplicate_name_across_endpoints_keeps_first() {
    let first = agent_server("Chat Agent", "first").await;
    let second = agent_server("Chat Agent", "second").await;

    let registry = registry();
    registry.register(&first.uri()).await.unwrap();
    let err = registry.register(&second.uri()).await.unwrap_err();

    assert!(matches!(err, RegistrationError::DuplicateName { ref name, .. } if name == "Chat Agent"));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.list_available()[0].description, "first");
}

#[tokio::test]
async fn test_rediscovery_is_idempotent() {
    let chat = agent_server("Chat Agent", "chat").await;
    let mut endpoints = BTreeMap::new();
    endpoints.insert("chat_agent".to_string(), endpoint(&chat, ""));

    let registry = registry();
    registry.discover(&endpoints).await;
    let report = registry.discover(&endpoints).await;

    assert!(report.is_complete());
    assert_eq!(registry.len(), 1);
}

// ============= Streaming transport =============

#[tokio::test]
async fn test_a2a_client_decodes_sse_frames() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        json!({"jsonrpc": "2.0", "id": "1", "result": {"kind": "status-update", "taskId": "t", "contextId": "c", "status": {"state": "working", "message": {"role": "agent", "parts": [{"kind": "text", "text": "Hi"}]}}, "final": false}}),
        json!({"jsonrpc": "2.0", "id": "1", "result": {"kind": "status-update", "taskId": "t", "contextId": "c", "status": {"state": "completed"}, "final": true}}),
    ]);

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("accept", "text/event-stream"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "message/stream",
            "params": {"metadata": {"session_id": "s1"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = A2AClient::new(reqwest::Client::new(), server.uri());
    let frames: Vec<_> = client
        .send_message_streaming(build_envelope(&Query::new("hello", "s1")))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(Result::is_ok));
}

#[tokio::test]
async fn test_a2a_client_http_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = A2AClient::new(reqwest::Client::new(), server.uri());
    let result = client
        .send_message_streaming(build_envelope(&Query::new("hello", "s1")))
        .await;

    match result {
        Err(TransportError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("expected an error"),
    }
}

#[tokio::test]
async fn test_a2a_client_accepts_plain_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "error": {"code": -32601, "message": "Method not found"}
        })))
        .mount(&server)
        .await;

    let client = A2AClient::new(reqwest::Client::new(), server.uri());
    let frames: Vec<_> = client
        .send_message_streaming(build_envelope(&Query::new("hello", "s1")))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(frames.len(), 1);
    assert!(matches!(
        frames[0],
        Ok(a2a_protocol::StreamResponse::Error { .. })
    ));
}

#[tokio::test]
async fn test_end_to_end_over_http() {
    let server = agent_server("Chat Agent", "chat").await;
    let body = sse_body(&[
        json!({"jsonrpc": "2.0", "id": "1", "result": {"kind": "task", "id": "t", "contextId": "c", "status": {"state": "submitted"}}}),
        json!({"jsonrpc": "2.0", "id": "1", "result": {"kind": "status-update", "taskId": "t", "contextId": "c", "status": {"state": "working"}, "final": false}}),
        json!({"jsonrpc": "2.0", "id": "1", "result": {"kind": "status-update", "taskId": "t", "contextId": "c", "status": {"state": "working", "message": {"role": "agent", "parts": [{"kind": "text", "text": "Hello"}]}}, "final": false}}),
        json!({"jsonrpc": "2.0", "id": "1", "result": {"kind": "status-update", "taskId": "t", "contextId": "c", "status": {"state": "completed"}, "final": true}}),
    ]);
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let registry = registry();
    registry.register(&server.uri()).await.unwrap();
    let service = AgentQueryService::new(
        registry,
        Arc::new(FixedSelector::picks("Chat Agent")),
        RelayOptions::default(),
    );

    let events: Vec<_> = service.stream(Query::new("hi", "s1")).collect().await;
    assert_eq!(
        events,
        vec![
            StreamEvent::unknown("Received unknown event: task"),
            StreamEvent::status("Agent is processing..."),
            StreamEvent::status("Hello"),
            StreamEvent::Complete,
        ]
    );
}

#[tokio::test]
async fn test_end_to_end_corrupt_frame_is_transport_error() {
    let server = agent_server("Chat Agent", "chat").await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("data: not json\n\n", "text/event-stream"),
        )
        .mount(&server)
        .await;

    let registry = registry();
    registry.register(&server.uri()).await.unwrap();
    let service = AgentQueryService::new(
        registry,
        Arc::new(FixedSelector::picks("Chat Agent")),
        RelayOptions::default(),
    );

    let events: Vec<_> = service.stream(Query::new("hi", "s1")).collect().await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        StreamEvent::Error { message } => assert!(message.starts_with("Agent transport error:")),
        other => panic!("expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stalled_agent_times_out_with_single_error() {
    let server = agent_server("Chat Agent", "chat").await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&[json!({"result": null})]), "text/event-stream")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let http = build_http_client(Duration::from_millis(200)).unwrap();
    let registry = Arc::new(AgentRegistry::new(http, CARD_PATH));
    registry.register(&server.uri()).await.unwrap();
    let service = AgentQueryService::new(
        registry,
        Arc::new(FixedSelector::picks("Chat Agent")),
        RelayOptions::default(),
    );

    let events: Vec<_> = service.stream(Query::new("hi", "s1")).collect().await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        StreamEvent::Error { message } => {
            assert!(message.starts_with("Agent transport error: timed out"), "{}", message)
        }
        other => panic!("expected error, got {:?}", other),
    }
}
