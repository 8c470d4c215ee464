use async_trait::async_trait;
use serde_json::Value;

use crate::infrastructure::mcp::{McpClient, McpError};
use crate::types::ToolDescriptor;

/// The `list_tools` / `call_tool` contract of a tool server.
#[async_trait]
pub trait ToolServerInterface: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError>;

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<String, McpError>;
}

#[async_trait]
impl ToolServerInterface for McpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
        McpClient::list_tools(self).await
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<String, McpError> {
        McpClient::call_tool(self, name, arguments).await
    }
}
