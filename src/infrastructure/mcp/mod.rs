//! MCP client over HTTP (streamable HTTP and legacy SSE transports).

mod client;
mod error;
mod protocol;
mod transport;

pub use client::McpClient;
pub use error::McpError;
pub use protocol::PROTOCOL_VERSION;
pub use transport::is_legacy_sse_url;
