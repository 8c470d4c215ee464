// MCP client tests - handshake, paging, result extraction and both HTTP
// transports against the in-process server in `common`.

mod common;

use calendar_agent::mcp::{McpClient, McpError, PROTOCOL_VERSION};
use calendar_agent::tooling::{RegistryError, ToolRegistry, ToolServerInterface};
use common::{FakeMcpServer, SESSION_ID};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const STREAM_END_DEADLINE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn handshake_then_paged_listing() {
    let server = FakeMcpServer::start().await;
    let client = McpClient::connect(&server.mcp_url()).await.expect("connect");

    assert_eq!(client.instructions(), Some("Use ISO 8601 timestamps."));

    let tools = client.list_tools().await.expect("list tools");
    let names: Vec<_> = tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(names, vec!["list_events", "create_event", "delete_event", "get_calendar"]);
    assert_eq!(tools[1].input_schema["required"], json!(["title", "start", "end"]));
    assert_eq!(tools[3].description, "");
    assert_eq!(tools[3].input_schema, json!({"type": "object", "properties": {}}));

    assert_eq!(
        server.methods().await,
        vec!["initialize", "notifications/initialized", "tools/list", "tools/list"]
    );
}

#[tokio::test]
async fn session_and_protocol_headers_follow_initialize() {
    let server = FakeMcpServer::start().await;
    let client = McpClient::connect(&server.mcp_url()).await.expect("connect");
    client.list_tools().await.expect("list tools");

    let headers = server.headers().await;
    assert_eq!(headers[0], (None, None));
    for (session, version) in &headers[1..] {
        assert_eq!(session.as_deref(), Some(SESSION_ID));
        assert_eq!(version.as_deref(), Some(PROTOCOL_VERSION));
    }

    client.close().await;
    assert!(server.session_deleted());
}

#[tokio::test]
async fn call_tool_extracts_text_content() {
    let server = FakeMcpServer::start().await;
    let client = McpClient::connect(&server.mcp_url()).await.expect("connect");

    let text = client
        .call_tool(
            "create_event",
            json!({"title": "Standup", "start": "2026-10-19T09:00:00", "end": "2026-10-19T09:15:00"}),
        )
        .await
        .expect("call succeeds");
    assert_eq!(text, "Created event evt_1: Standup");

    let calls = server.calls().await;
    assert_eq!(calls[0].0, "create_event");
    assert_eq!(calls[0].1["start"], json!("2026-10-19T09:00:00"));
}

#[tokio::test]
async fn call_tool_reads_event_stream_responses() {
    let server = FakeMcpServer::start().await;
    let client = McpClient::connect(&server.mcp_url()).await.expect("connect");

    let text = client
        .call_tool("list_events", serde_json::Value::Null)
        .await
        .expect("call succeeds");
    assert_eq!(text, "No events found");
    assert_eq!(server.calls().await[0].1, json!({}));
}

#[tokio::test]
async fn ping_on_response_stream_is_answered() {
    let server = FakeMcpServer::start().await;
    let client = McpClient::connect(&server.mcp_url()).await.expect("connect");

    client.call_tool("list_events", json!({})).await.expect("call succeeds");

    assert_eq!(
        server.replies().await,
        vec![json!({"jsonrpc": "2.0", "id": "srv-1", "result": {}})]
    );
}

#[tokio::test]
async fn structured_only_results_are_rendered_as_json() {
    let server = FakeMcpServer::start().await;
    let client = McpClient::connect(&server.mcp_url()).await.expect("connect");

    let text = client.call_tool("get_calendar", json!({})).await.expect("call");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json text");
    assert_eq!(value, json!({"id": "primary", "timeZone": "Europe/Berlin"}));
}

#[tokio::test]
async fn is_error_results_become_tool_failures() {
    let server = FakeMcpServer::start().await;
    let client = McpClient::connect(&server.mcp_url()).await.expect("connect");

    let err = client
        .call_tool("delete_event", json!({"event_id": "evt_9"}))
        .await
        .unwrap_err();
    match err {
        McpError::ToolFailed { tool, message } => {
            assert_eq!(tool, "delete_event");
            assert_eq!(message, "Event evt_9 not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_fails_to_connect() {
    let result = McpClient::connect("http://127.0.0.1:9/mcp").await;
    assert!(matches!(result, Err(McpError::Connect { .. })));
}

#[tokio::test]
async fn legacy_sse_transport_round_trips() {
    let server = FakeMcpServer::start().await;
    let client = McpClient::connect(&server.sse_url()).await.expect("connect");

    let tools = client.list_tools().await.expect("list tools");
    assert_eq!(tools.len(), 4);

    let text = client
        .call_tool("create_event", json!({"title": "Review"}))
        .await
        .expect("call succeeds");
    assert_eq!(text, "Created event evt_1: Review");

    client.close().await;
}

#[tokio::test]
async fn legacy_stream_end_fails_in_flight_and_later_requests() {
    let server = FakeMcpServer::start_ending_stream_on_call().await;
    let client = McpClient::connect(&server.sse_url()).await.expect("connect");
    assert_eq!(client.list_tools().await.expect("list tools").len(), 4);

    let in_flight = timeout(STREAM_END_DEADLINE, client.call_tool("list_events", json!({})))
        .await
        .expect("in-flight call resolves once the stream ends");
    assert!(matches!(in_flight, Err(McpError::Terminated)), "{in_flight:?}");

    let later = timeout(STREAM_END_DEADLINE, client.list_tools())
        .await
        .expect("later request does not wait on a dead stream");
    assert!(matches!(later, Err(McpError::Terminated)), "{later:?}");

    let after_close = timeout(STREAM_END_DEADLINE, client.call_tool("get_calendar", json!({})))
        .await
        .expect("call after the stream ended resolves");
    assert!(matches!(after_close, Err(McpError::Terminated)));
    assert_eq!(server.methods().await.iter().filter(|m| *m == "tools/call").count(), 1);

    client.close().await;
}

#[tokio::test]
async fn registry_loads_every_page() {
    let server = FakeMcpServer::start().await;
    let client: Arc<dyn ToolServerInterface> =
        Arc::new(McpClient::connect(&server.mcp_url()).await.expect("connect"));

    let registry = ToolRegistry::load(client).await.expect("registry");
    assert_eq!(registry.len(), 4);
    assert!(registry.contains("delete_event"));

    let err = registry
        .invoke("delete_event", json!({"event_id": "evt_3"}))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to call MCP tool 'delete_event': Event evt_3 not found"
    );
}

#[tokio::test]
async fn empty_catalogue_is_fatal() {
    let server = FakeMcpServer::start_empty().await;
    let client: Arc<dyn ToolServerInterface> =
        Arc::new(McpClient::connect(&server.mcp_url()).await.expect("connect"));

    let err = ToolRegistry::load(client).await.unwrap_err();
    assert!(matches!(err, RegistryError::Empty));
    assert_eq!(err.to_string(), "No tools available from MCP server");
}
