mod http;
mod sse;

pub use http::StreamableHttpTransport;
pub use sse::LegacySseTransport;

use async_trait::async_trait;
use reqwest::Url;

use super::error::McpError;
use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// A bidirectional JSON-RPC channel to one MCP server.
#[async_trait]
pub trait McpTransport: Send + Sync {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError>;

    async fn notify(&self, notification: JsonRpcNotification) -> Result<(), McpError>;

    /// Called once the initialize handshake settled on a protocol version.
    fn set_protocol_version(&self, _version: &str) {}

    async fn close(&self);
}

/// Servers mounted under `/sse` speak the legacy HTTP+SSE transport.
pub fn is_legacy_sse_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| parsed.path().trim_end_matches('/').ends_with("/sse"))
        .unwrap_or(false)
}
