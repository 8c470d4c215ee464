use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Url};
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::{Event, EventSource};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::McpTransport;
use crate::infrastructure::mcp::error::McpError;
use crate::infrastructure::mcp::protocol::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, find_response, server_request_reply,
};

type Responder = oneshot::Sender<Result<JsonRpcResponse, McpError>>;

/// Legacy HTTP+SSE transport: a long-lived GET stream delivers responses,
/// messages are POSTed to the URL announced by the `endpoint` event.
pub struct LegacySseTransport {
    inner: Arc<SseInner>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

struct SseInner {
    endpoint: String,
    http: Client,
    pending: Mutex<HashMap<u64, Responder>>,
    /// Set once the event stream is gone; only written with `pending` held.
    closed: AtomicBool,
}

impl LegacySseTransport {
    pub async fn connect(url: &str, http: Client) -> Result<Self, McpError> {
        let mut source = EventSource::new(http.get(url))
            .map_err(|err| McpError::transport(format!("cannot open event stream: {err}")))?;
        source.set_retry_policy(Box::new(Never));
        let mut source = Box::pin(source);

        let endpoint = loop {
            match source.next().await {
                Some(Ok(Event::Open)) => continue,
                Some(Ok(Event::Message(message))) if message.event == "endpoint" => {
                    break resolve_endpoint(url, message.data.trim())?;
                }
                Some(Ok(Event::Message(message))) => {
                    debug!(event = message.event.as_str(), "Ignoring event before endpoint");
                }
                Some(Err(err)) => {
                    return Err(McpError::transport(format!(
                        "event stream at '{url}' failed: {err}"
                    )));
                }
                None => return Err(McpError::Terminated),
            }
        };
        debug!(endpoint = endpoint.as_str(), "MCP SSE endpoint announced");

        let inner = Arc::new(SseInner {
            endpoint,
            http,
            pending: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        });
        let reader_inner = Arc::clone(&inner);
        let reader = tokio::spawn(async move {
            reader_inner.reader_loop(source).await;
        });

        Ok(Self {
            inner,
            reader: Mutex::new(Some(reader)),
        })
    }
}

fn resolve_endpoint(base: &str, endpoint: &str) -> Result<String, McpError> {
    let base = Url::parse(base).map_err(|err| McpError::transport(err.to_string()))?;
    base.join(endpoint)
        .map(|url| url.to_string())
        .map_err(|err| McpError::transport(format!("invalid endpoint '{endpoint}': {err}")))
}

impl SseInner {
    async fn reader_loop(self: Arc<Self>, mut source: Pin<Box<EventSource>>) {
        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(message)) => {
                    if message.event != "message" && !message.event.is_empty() {
                        debug!(event = message.event.as_str(), "Ignoring SSE event");
                        continue;
                    }
                    match serde_json::from_str::<Value>(&message.data) {
                        Ok(value) => self.process_inbound_message(value).await,
                        Err(source) => {
                            warn!(%source, "Received invalid JSON on MCP event stream");
                        }
                    }
                }
                Err(err) => {
                    warn!(%err, "MCP event stream closed");
                    break;
                }
            }
        }
        drop(source);
        self.shut_down().await;
    }

    async fn process_inbound_message(&self, value: Value) {
        let method = value.get("method").and_then(Value::as_str).map(str::to_owned);
        let id = value.get("id").cloned();
        match (method, id) {
            (Some(method), Some(id)) => self.handle_server_request(&method, id).await,
            (Some(method), None) => {
                debug!(method = method.as_str(), "Received MCP notification");
            }
            (None, Some(id)) => {
                let Some(key) = id.as_u64().or_else(|| id.as_str().and_then(|s| s.parse().ok()))
                else {
                    return;
                };
                let responder = self.pending.lock().await.remove(&key);
                match responder {
                    Some(sender) => {
                        let parsed = serde_json::from_value(value)
                            .map_err(|source| McpError::InvalidJson { source });
                        let _ = sender.send(parsed);
                    }
                    None => debug!(response_id = key, "Response for unknown request"),
                }
            }
            (None, None) => {}
        }
    }

    async fn handle_server_request(&self, method: &str, id: Value) {
        if method != "ping" {
            warn!(method, "Server sent unsupported request");
        }
        let reply = server_request_reply(method, id);
        if let Err(err) = self.post(&reply).await {
            warn!(%err, "Failed to answer server request");
        }
    }

    async fn post<T: Serialize>(&self, body: &T) -> Result<reqwest::Response, McpError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|source| McpError::Connect {
                url: self.endpoint.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Http {
                url: self.endpoint.clone(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Marks the transport closed and fails every waiting caller.
    async fn shut_down(&self) {
        let mut pending = self.pending.lock().await;
        self.closed.store(true, Ordering::SeqCst);
        for (_, sender) in pending.drain() {
            let _ = sender.send(Err(McpError::Terminated));
        }
    }
}

#[async_trait]
impl McpTransport for LegacySseTransport {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        let id = request.id;
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.inner.pending.lock().await;
            if self.inner.closed.load(Ordering::SeqCst) {
                return Err(McpError::Terminated);
            }
            pending.insert(id, tx);
        }

        debug!(id, method = request.method.as_str(), "Posting MCP request");
        let response = match self.inner.post(&request).await {
            Ok(response) => response,
            Err(err) => {
                self.inner.pending.lock().await.remove(&id);
                return Err(err);
            }
        };

        // Some servers answer inline instead of on the stream.
        if let Ok(body) = response.json::<Value>().await {
            if let Some(inline) = find_response(body, id) {
                self.inner.pending.lock().await.remove(&id);
                return inline;
            }
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(McpError::Cancelled),
        }
    }

    async fn notify(&self, notification: JsonRpcNotification) -> Result<(), McpError> {
        self.inner.post(&notification).await.map(|_| ())
    }

    async fn close(&self) {
        if let Some(reader) = self.reader.lock().await.take() {
            reader.abort();
        }
        self.inner.shut_down().await;
    }
}
