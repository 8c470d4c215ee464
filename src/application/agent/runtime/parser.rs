use serde_json::Map;

use super::{AgentDirective, AgentError, ToolRuntime, Value};
use crate::types::FunctionCall;

impl ToolRuntime {
    /// Parses and validates a model answer. Every requested function must be
    /// registered; anything else fails the loop.
    pub(in crate::application::agent) fn parse_directive(
        &self,
        content: &str,
    ) -> Result<AgentDirective, AgentError> {
        let value = extract_json(content)?;
        let Value::Object(mut map) = value else {
            return Err(AgentError::InvalidResponse(
                "response must be a JSON object".into(),
            ));
        };

        let reasoning = match map.remove("reasoning") {
            Some(Value::String(text)) => text,
            Some(_) => {
                return Err(AgentError::InvalidResponse(
                    "reasoning must be a string".into(),
                ));
            }
            None => {
                return Err(AgentError::InvalidResponse(
                    "missing reasoning field".into(),
                ));
            }
        };

        let calls = match map.remove("function_calls") {
            Some(Value::Array(calls)) => calls,
            Some(_) => {
                return Err(AgentError::InvalidResponse(
                    "function_calls must be a list".into(),
                ));
            }
            None => {
                return Err(AgentError::InvalidResponse(
                    "missing function_calls field".into(),
                ));
            }
        };

        let function_calls = calls
            .into_iter()
            .map(|call| self.parse_call(call))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AgentDirective {
            function_calls,
            reasoning,
        })
    }

    fn parse_call(&self, call: Value) -> Result<FunctionCall, AgentError> {
        let Value::Object(mut call) = call else {
            return Err(AgentError::InvalidResponse(
                "each function call must be an object".into(),
            ));
        };
        let name = match call.remove("name") {
            Some(Value::String(name)) => name,
            _ => {
                return Err(AgentError::InvalidResponse(
                    "function call missing 'name' field".into(),
                ));
            }
        };
        if !self.registry().contains(&name) {
            return Err(AgentError::InvalidResponse(format!(
                "unknown function: {name}"
            )));
        }
        let arguments: Map<String, Value> = match call.remove("arguments") {
            Some(Value::Object(arguments)) => arguments,
            Some(_) => {
                return Err(AgentError::InvalidResponse(format!(
                    "arguments for {name} must be an object"
                )));
            }
            None => {
                return Err(AgentError::InvalidResponse(format!(
                    "function call {name} missing 'arguments' field"
                )));
            }
        };
        Ok(FunctionCall { name, arguments })
    }
}

/// Accepts bare JSON or JSON wrapped in a markdown code fence.
fn extract_json(content: &str) -> Result<Value, AgentError> {
    let trimmed = content.trim();

    let candidate = if trimmed.starts_with("```") {
        let stripped = trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```JSON")
            .trim_start_matches("```");
        match stripped.rfind("```") {
            Some(end) => stripped[..end].trim(),
            None => stripped.trim(),
        }
    } else {
        trimmed
    };

    serde_json::from_str(candidate).map_err(|source| AgentError::MalformedJson {
        content: content.to_string(),
        source,
    })
}
