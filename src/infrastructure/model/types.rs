//! Model types - Request, Response, and Error types

use crate::types::{ChatMessage, ToolDescriptor};
use reqwest::StatusCode;
use thiserror::Error;

/// Request for a single JSON-mode completion
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub messages: Vec<ChatMessage>,
}

impl ModelRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

/// Text produced by the model
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub content: String,
}

impl ModelResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// One item of input for a function-calling turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnInput {
    User(String),
    FunctionCallOutput { call_id: String, output: String },
}

/// A turn of the native function-calling protocol
#[derive(Debug, Clone)]
pub struct ToolTurnRequest {
    pub instructions: String,
    pub input: Vec<TurnInput>,
    pub tools: Vec<ToolDescriptor>,
    pub previous_response_id: Option<String>,
}

/// A function call emitted by the model; `arguments` is raw JSON text
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedCall {
    pub call_id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone)]
pub struct ToolTurnResponse {
    pub response_id: String,
    pub text: String,
    pub calls: Vec<RequestedCall>,
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' answered with HTTP {status}: {message}")]
    Api {
        provider: String,
        status: StatusCode,
        message: String,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Short message suitable for the console
    pub fn user_message(&self) -> String {
        match self {
            ModelError::MissingApiKey { provider } => {
                format!("Provider '{provider}' requires an API key.")
            }
            ModelError::Network { provider, source } => {
                if source.is_connect() {
                    format!("Could not connect to model provider '{provider}'.")
                } else if source.is_timeout() {
                    format!("Request to '{provider}' timed out.")
                } else {
                    format!("Network error talking to '{provider}'.")
                }
            }
            ModelError::Api {
                provider,
                status,
                message,
            } => match *status {
                StatusCode::UNAUTHORIZED => format!("'{provider}' rejected the API key."),
                StatusCode::TOO_MANY_REQUESTS => format!("'{provider}' is rate limiting requests."),
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                    format!("'{provider}' is currently unavailable.")
                }
                _ => format!("'{provider}' failed with {}: {message}", status.as_u16()),
            },
            ModelError::InvalidResponse { provider, reason } => {
                format!("Response from '{provider}' was not usable: {reason}")
            }
        }
    }
}
