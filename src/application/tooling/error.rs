use crate::infrastructure::mcp::McpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool requested: {0}")]
    UnknownTool(String),
    #[error("Failed to call MCP tool '{tool}': {source}")]
    Execution {
        tool: String,
        #[source]
        source: McpError,
    },
}

/// Startup failures; all of them are fatal.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to load tools from MCP server: {0}")]
    Discovery(#[from] McpError),
    #[error("No tools available from MCP server")]
    Empty,
}

impl RegistryError {
    pub fn user_message(&self) -> String {
        match self {
            RegistryError::Discovery(source) => source.user_message(),
            RegistryError::Empty => "No tools available from MCP server.".to_string(),
        }
    }
}
