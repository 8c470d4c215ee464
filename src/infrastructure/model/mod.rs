//! LLM provider access (OpenAI Responses API).

mod adapter;
mod base;
mod openai;
mod traits;
mod types;

pub use openai::OpenAIClient;
pub use traits::{FunctionCallingProvider, ModelProvider};
pub use types::{
    ModelError, ModelRequest, ModelResponse, RequestedCall, ToolTurnRequest, ToolTurnResponse,
    TurnInput,
};
