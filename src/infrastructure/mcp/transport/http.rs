use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;
use tracing::{debug, warn};

use super::McpTransport;
use crate::infrastructure::mcp::error::McpError;
use crate::infrastructure::mcp::protocol::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, find_response, is_response_to,
    server_request_reply,
};

const SESSION_HEADER: &str = "Mcp-Session-Id";
const PROTOCOL_HEADER: &str = "MCP-Protocol-Version";

/// Streamable HTTP transport: every message is a POST to one URL, the reply
/// comes back as plain JSON or as an SSE stream on the same response.
pub struct StreamableHttpTransport {
    url: String,
    http: Client,
    session_id: Mutex<Option<String>>,
    protocol_version: Mutex<Option<String>>,
}

impl StreamableHttpTransport {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self {
            url: url.into(),
            http,
            session_id: Mutex::new(None),
            protocol_version: Mutex::new(None),
        }
    }

    fn post<T: Serialize>(&self, body: &T) -> RequestBuilder {
        let mut builder = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json, text/event-stream")
            .json(body);
        if let Some(session) = self.session_id() {
            builder = builder.header(SESSION_HEADER, session);
        }
        if let Some(version) = self.lock_version().clone() {
            builder = builder.header(PROTOCOL_HEADER, version);
        }
        builder
    }

    fn session_id(&self) -> Option<String> {
        self.session_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn lock_version(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.protocol_version
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remember_session(&self, response: &Response) {
        let Some(value) = response.headers().get(SESSION_HEADER) else {
            return;
        };
        if let Ok(session) = value.to_str() {
            let mut slot = self
                .session_id
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.as_deref() != Some(session) {
                debug!(session, "MCP session established");
                *slot = Some(session.to_string());
            }
        }
    }

    async fn send<T: Serialize>(&self, body: &T) -> Result<Response, McpError> {
        let response = self
            .post(body)
            .send()
            .await
            .map_err(|source| McpError::Connect {
                url: self.url.clone(),
                source,
            })?;
        self.remember_session(&response);

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Http {
                url: self.url.clone(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn read_event_stream(&self, response: Response, id: u64) -> Result<JsonRpcResponse, McpError> {
        let mut events = response.bytes_stream().eventsource();
        while let Some(event) = events.next().await {
            let event = event.map_err(|err| McpError::transport(err.to_string()))?;
            if event.data.trim().is_empty() {
                continue;
            }
            let message: Value = serde_json::from_str(&event.data)
                .map_err(|source| McpError::InvalidJson { source })?;
            if is_response_to(&message, id) {
                return serde_json::from_value(message)
                    .map_err(|source| McpError::InvalidJson { source });
            }
            let method = message.get("method").and_then(Value::as_str).unwrap_or_default();
            match message.get("id") {
                Some(request_id) if !method.is_empty() => {
                    self.answer_server_request(method, request_id.clone()).await;
                }
                _ => debug!(method, "Skipping unrelated message on MCP response stream"),
            }
        }
        Err(McpError::MissingResponse { id })
    }

    async fn answer_server_request(&self, method: &str, id: Value) {
        if method != "ping" {
            warn!(method, "Server sent unsupported request");
        }
        let reply = server_request_reply(method, id);
        if let Err(err) = self.send(&reply).await {
            warn!(%err, "Failed to answer server request");
        }
    }
}

#[async_trait]
impl McpTransport for StreamableHttpTransport {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        let id = request.id;
        debug!(id, method = request.method.as_str(), "Sending MCP request");
        let response = self.send(&request).await?;

        let is_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/event-stream"));
        if is_stream {
            return self.read_event_stream(response, id).await;
        }

        let bytes = response.bytes().await.map_err(|source| McpError::Connect {
            url: self.url.clone(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(McpError::MissingResponse { id });
        }
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|source| McpError::InvalidJson { source })?;
        find_response(body, id).unwrap_or(Err(McpError::MissingResponse { id }))
    }

    async fn notify(&self, notification: JsonRpcNotification) -> Result<(), McpError> {
        debug!(method = notification.method.as_str(), "Sending MCP notification");
        self.send(&notification).await.map(|_| ())
    }

    fn set_protocol_version(&self, version: &str) {
        *self.lock_version() = Some(version.to_string());
    }

    async fn close(&self) {
        let Some(session) = self.session_id() else {
            return;
        };
        let result = self
            .http
            .delete(&self.url)
            .header(SESSION_HEADER, session.as_str())
            .send()
            .await;
        if let Err(err) = result {
            debug!(%err, "Failed to terminate MCP session");
        }
    }
}
