use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("failed to reach MCP server at '{url}': {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("MCP server at '{url}' answered with HTTP {status}: {body}")]
    Http {
        url: String,
        status: u16,
        body: String,
    },
    #[error("MCP transport error: {message}")]
    Transport { message: String },
    #[error("MCP server returned invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("MCP server returned JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("MCP server sent no response for request {id}")]
    MissingResponse { id: u64 },
    #[error("MCP event stream terminated unexpectedly")]
    Terminated,
    #[error("MCP request cancelled")]
    Cancelled,
    #[error("{message}")]
    ToolFailed { tool: String, message: String },
}

impl McpError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            McpError::Connect { url, .. } => {
                format!("Could not connect to the calendar tool server at {url}. Is it running?")
            }
            McpError::Http { status, .. } => {
                format!("The calendar tool server rejected the request (HTTP {status}).")
            }
            McpError::ToolFailed { tool, message } => format!("Tool '{tool}' failed: {message}"),
            other => format!("Calendar tool server error: {other}"),
        }
    }
}
