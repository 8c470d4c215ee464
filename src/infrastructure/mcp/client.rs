use reqwest::Client;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use super::error::McpError;
use super::protocol::{
    CallToolResult, InitializeResult, JsonRpcNotification, JsonRpcRequest, ListToolsResult,
    PROTOCOL_VERSION,
};
use super::transport::{
    LegacySseTransport, McpTransport, StreamableHttpTransport, is_legacy_sse_url,
};
use crate::types::{ToolDescriptor, empty_object_schema};

/// Upper bound on `tools/list` pages, guards against servers that keep
/// returning a cursor.
const MAX_LIST_PAGES: usize = 64;

/// Client half of one MCP session over HTTP.
pub struct McpClient {
    url: String,
    transport: Box<dyn McpTransport>,
    id_counter: AtomicU64,
    instructions: Option<String>,
}

impl McpClient {
    /// Opens a session and performs the `initialize` handshake.
    pub async fn connect(url: &str) -> Result<Self, McpError> {
        Self::connect_with(url, Client::new()).await
    }

    pub async fn connect_with(url: &str, http: Client) -> Result<Self, McpError> {
        let transport: Box<dyn McpTransport> = if is_legacy_sse_url(url) {
            debug!(url, "Using legacy SSE transport");
            Box::new(LegacySseTransport::connect(url, http).await?)
        } else {
            debug!(url, "Using streamable HTTP transport");
            Box::new(StreamableHttpTransport::new(url, http))
        };

        let mut client = Self {
            url: url.to_string(),
            transport,
            id_counter: AtomicU64::new(1),
            instructions: None,
        };
        if let Err(err) = client.initialize().await {
            client.transport.close().await;
            return Err(err);
        }
        Ok(client)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    async fn initialize(&mut self) -> Result<(), McpError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "title": "Calendar Agent"
            },
            "capabilities": {}
        });
        let raw = self.send_request("initialize", params).await?;
        let result: InitializeResult =
            serde_json::from_value(raw).map_err(|source| McpError::InvalidJson { source })?;

        let version = result
            .protocol_version
            .unwrap_or_else(|| PROTOCOL_VERSION.to_string());
        if version != PROTOCOL_VERSION {
            warn!(
                requested = PROTOCOL_VERSION,
                negotiated = version.as_str(),
                "MCP server negotiated a different protocol version"
            );
        }
        self.transport.set_protocol_version(&version);
        self.instructions = result.instructions;
        if let Some(server) = &result.server_info {
            info!(
                url = self.url.as_str(),
                server = server.name.as_str(),
                version = server.version.as_deref().unwrap_or("unknown"),
                "Connected to MCP server"
            );
        }

        self.transport
            .notify(JsonRpcNotification::new(
                "notifications/initialized",
                json!({}),
            ))
            .await
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, McpError> {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        self.transport
            .request(JsonRpcRequest::new(id, method, params))
            .await?
            .into_result()
    }

    /// Fetches the whole tool catalogue, following pagination cursors.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let params = match &cursor {
                Some(cursor) => json!({ "cursor": cursor }),
                None => json!({}),
            };
            let raw = self.send_request("tools/list", params).await?;
            let page: ListToolsResult =
                serde_json::from_value(raw).map_err(|source| McpError::InvalidJson { source })?;

            tools.extend(page.tools.into_iter().map(|tool| ToolDescriptor {
                name: tool.name,
                description: tool.description.unwrap_or_default(),
                input_schema: tool.input_schema.unwrap_or_else(empty_object_schema),
            }));

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(tools),
            }
        }

        warn!(pages = MAX_LIST_PAGES, "Stopped following tools/list cursors");
        Ok(tools)
    }

    /// Invokes `name` and returns its textual result. A result flagged with
    /// `isError` becomes [`McpError::ToolFailed`].
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String, McpError> {
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let raw = self
            .send_request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        let result: CallToolResult = serde_json::from_value(raw.clone())
            .map_err(|source| McpError::InvalidJson { source })?;
        let text = result.text(&raw);
        if result.is_error {
            return Err(McpError::ToolFailed {
                tool: name.to_string(),
                message: text,
            });
        }
        Ok(text)
    }

    pub async fn close(&self) {
        self.transport.close().await;
    }
}
