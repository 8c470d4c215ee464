// In-process MCP server for integration tests.
//
// Serves the streamable HTTP transport on `/mcp` and the legacy SSE
// transport on `/sse` + `/messages`, with a small calendar catalogue split
// over two `tools/list` pages.
//
// Responses the client sends back to server requests (e.g. `ping`) are
// recorded in `replies`.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{StreamExt, stream};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};

pub const SESSION_ID: &str = "session-1";

#[derive(Default)]
struct ServerState {
    empty_catalogue: bool,
    end_stream_on_call: bool,
    methods: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, Value)>>,
    headers: Mutex<Vec<(Option<String>, Option<String>)>>,
    deleted: AtomicBool,
    stream: Mutex<Option<mpsc::UnboundedSender<String>>>,
    replies: Mutex<Vec<Value>>,
}

pub struct FakeMcpServer {
    base_url: String,
    state: Arc<ServerState>,
}

impl FakeMcpServer {
    pub async fn start() -> Self {
        Self::spawn(ServerState::default()).await
    }

    /// A server whose `tools/list` returns nothing.
    pub async fn start_empty() -> Self {
        Self::spawn(ServerState {
            empty_catalogue: true,
            ..ServerState::default()
        })
        .await
    }

    /// A server whose legacy event stream ends as soon as a `tools/call`
    /// arrives, leaving that call unanswered.
    pub async fn start_ending_stream_on_call() -> Self {
        Self::spawn(ServerState {
            end_stream_on_call: true,
            ..ServerState::default()
        })
        .await
    }

    async fn spawn(state: ServerState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/mcp", post(streamable_post).delete(streamable_delete))
            .route("/sse", get(sse_stream))
            .route("/messages", post(sse_post))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake MCP server");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn mcp_url(&self) -> String {
        format!("{}/mcp", self.base_url)
    }

    pub fn sse_url(&self) -> String {
        format!("{}/sse", self.base_url)
    }

    pub async fn methods(&self) -> Vec<String> {
        self.state.methods.lock().await.clone()
    }

    pub async fn calls(&self) -> Vec<(String, Value)> {
        self.state.calls.lock().await.clone()
    }

    /// `(Mcp-Session-Id, MCP-Protocol-Version)` of every POST to `/mcp`.
    pub async fn headers(&self) -> Vec<(Option<String>, Option<String>)> {
        self.state.headers.lock().await.clone()
    }

    pub async fn replies(&self) -> Vec<Value> {
        self.state.replies.lock().await.clone()
    }

    pub fn session_deleted(&self) -> bool {
        self.state.deleted.load(Ordering::SeqCst)
    }
}

impl ServerState {
    /// Records `message` when it is the client's reply to a server request.
    async fn take_reply(&self, message: &Value) -> bool {
        if message.get("method").is_some() {
            return false;
        }
        self.replies.lock().await.push(message.clone());
        true
    }

    async fn answer(&self, message: &Value) -> Option<Value> {
        let method = message
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.methods.lock().await.push(method.clone());
        let id = message.get("id")?.clone();

        let result = match method.as_str() {
            "initialize" => json!({
                "protocolVersion": "2025-06-18",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "fake-calendar", "version": "0.0.1"},
                "instructions": "Use ISO 8601 timestamps."
            }),
            "tools/list" => self.list_page(message),
            "tools/call" => {
                let name = message["params"]["name"].as_str().unwrap_or_default().to_string();
                let arguments = message["params"]["arguments"].clone();
                self.calls.lock().await.push((name.clone(), arguments.clone()));
                call_result(&name, &arguments)
            }
            other => {
                return Some(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32601, "message": format!("Method not found: {other}")}
                }));
            }
        };
        Some(json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }

    fn list_page(&self, message: &Value) -> Value {
        if self.empty_catalogue {
            return json!({"tools": []});
        }
        match message["params"]["cursor"].as_str() {
            None => json!({
                "tools": [
                    {
                        "name": "list_events",
                        "description": "List calendar events for a day",
                        "inputSchema": {"type": "object", "properties": {"date": {"type": "string"}}}
                    },
                    {
                        "name": "create_event",
                        "description": "Create a new calendar event",
                        "inputSchema": {
                            "type": "object",
                            "properties": {
                                "title": {"type": "string"},
                                "start": {"type": "string"},
                                "end": {"type": "string"}
                            },
                            "required": ["title", "start", "end"]
                        }
                    }
                ],
                "nextCursor": "page-2"
            }),
            Some(_) => json!({
                "tools": [
                    {"name": "delete_event", "description": "Delete an event by id"},
                    {"name": "get_calendar"}
                ]
            }),
        }
    }
}

fn call_result(name: &str, arguments: &Value) -> Value {
    match name {
        "list_events" => json!({
            "content": [{"type": "text", "text": "No events found"}]
        }),
        "create_event" => json!({
            "content": [{
                "type": "text",
                "text": format!("Created event evt_1: {}", arguments["title"].as_str().unwrap_or("untitled"))
            }]
        }),
        "delete_event" => json!({
            "content": [{
                "type": "text",
                "text": format!("Event {} not found", arguments["event_id"].as_str().unwrap_or("?"))
            }],
            "isError": true
        }),
        "get_calendar" => json!({
            "content": [],
            "structuredContent": {"id": "primary", "timeZone": "Europe/Berlin"}
        }),
        other => json!({
            "content": [{"type": "text", "text": format!("Unknown tool: {other}")}],
            "isError": true
        }),
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn streamable_post(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(message): Json<Value>,
) -> Response {
    state.headers.lock().await.push((
        header_value(&headers, "mcp-session-id"),
        header_value(&headers, "mcp-protocol-version"),
    ));

    if state.take_reply(&message).await {
        return StatusCode::ACCEPTED.into_response();
    }
    let Some(reply) = state.answer(&message).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    // list_events answers as an event stream, preceded by a progress
    // notification to skip and a ping the client must answer.
    if message["params"]["name"] == "list_events" {
        let progress = json!({"jsonrpc": "2.0", "method": "notifications/progress", "params": {"progress": 1}});
        let ping = json!({"jsonrpc": "2.0", "id": "srv-1", "method": "ping"});
        let body = format!(
            "event: message\ndata: {progress}\n\nevent: message\ndata: {ping}\n\nevent: message\ndata: {reply}\n\n"
        );
        return ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response();
    }

    ([("mcp-session-id", SESSION_ID)], Json(reply)).into_response()
}

async fn streamable_delete(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> StatusCode {
    if header_value(&headers, "mcp-session-id").as_deref() == Some(SESSION_ID) {
        state.deleted.store(true, Ordering::SeqCst);
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn sse_stream(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    *state.stream.lock().await = Some(tx);

    let endpoint = stream::once(async {
        Ok::<_, Infallible>(Event::default().event("endpoint").data("/messages?session_id=abc"))
    });
    let messages = stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|data| (Ok::<_, Infallible>(Event::default().event("message").data(data)), rx))
    });
    Sse::new(endpoint.chain(messages))
}

async fn sse_post(State(state): State<Arc<ServerState>>, Json(message): Json<Value>) -> StatusCode {
    if state.take_reply(&message).await {
        return StatusCode::ACCEPTED;
    }
    if state.end_stream_on_call && message["method"] == "tools/call" {
        state.methods.lock().await.push("tools/call".to_string());
        // Dropping the sender finishes the event stream.
        state.stream.lock().await.take();
        return StatusCode::ACCEPTED;
    }
    if let Some(reply) = state.answer(&message).await {
        if let Some(stream) = state.stream.lock().await.as_ref() {
            let _ = stream.send(reply.to_string());
        }
    }
    StatusCode::ACCEPTED
}
