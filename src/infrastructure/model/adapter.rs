//! Message adapters - convert domain values to Responses API input items

use super::types::TurnInput;
use crate::types::{ChatMessage, ToolDescriptor};
use serde_json::{Value, json};

pub struct MessageAdapter;

impl MessageAdapter {
    /// `[{"role": "...", "content": "..."}]`
    pub fn to_input_messages(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content.clone()
                })
            })
            .collect()
    }

    pub fn to_input_items(items: &[TurnInput]) -> Vec<Value> {
        items
            .iter()
            .map(|item| match item {
                TurnInput::User(text) => json!({ "role": "user", "content": text }),
                TurnInput::FunctionCallOutput { call_id, output } => json!({
                    "type": "function_call_output",
                    "call_id": call_id,
                    "output": output
                }),
            })
            .collect()
    }

    pub fn to_function_tools(tools: &[ToolDescriptor]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                    "strict": false
                })
            })
            .collect()
    }
}
