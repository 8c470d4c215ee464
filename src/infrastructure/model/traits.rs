//! Model traits

use super::types::{ModelError, ModelRequest, ModelResponse, ToolTurnRequest, ToolTurnResponse};
use async_trait::async_trait;

/// A model that answers with a single JSON object
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}

/// A model driving native function calls turn by turn
#[async_trait]
pub trait FunctionCallingProvider: Send + Sync {
    async fn respond(&self, request: ToolTurnRequest) -> Result<ToolTurnResponse, ModelError>;
}
