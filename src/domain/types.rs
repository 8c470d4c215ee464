use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// A tool advertised by the MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object_schema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: empty_object_schema(),
        }
    }

    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

pub fn empty_object_schema() -> Value {
    let mut schema = Map::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("properties".to_string(), Value::Object(Map::new()));
    Value::Object(schema)
}

/// A call requested by the model: `{"name": ..., "arguments": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl FunctionCall {
    pub fn arguments_value(&self) -> Value {
        Value::Object(self.arguments.clone())
    }
}

/// Outcome of one executed call. Serialises with either a `result` or an
/// `error` key, mirroring what is fed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallResult {
    pub function: String,
    pub arguments: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

impl FunctionCallResult {
    pub fn success(call: &FunctionCall, result: impl Into<String>) -> Self {
        Self {
            function: call.name.clone(),
            arguments: call.arguments.clone(),
            result: Some(result.into()),
            error: None,
            success: true,
        }
    }

    pub fn failure(call: &FunctionCall, error: impl Into<String>) -> Self {
        Self {
            function: call.name.clone(),
            arguments: call.arguments.clone(),
            result: None,
            error: Some(error.into()),
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_event_call() -> FunctionCall {
        serde_json::from_value(json!({
            "name": "create_event",
            "arguments": {"title": "Sync", "start": "2026-10-19T14:00:00"}
        }))
        .expect("valid call")
    }

    #[test]
    fn successful_result_omits_error_key() {
        let value = serde_json::to_value(FunctionCallResult::success(&create_event_call(), "ok"))
            .expect("serialize");
        assert_eq!(value["function"], "create_event");
        assert_eq!(value["result"], "ok");
        assert_eq!(value["success"], true);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failed_result_omits_result_key() {
        let value =
            serde_json::to_value(FunctionCallResult::failure(&create_event_call(), "boom"))
                .expect("serialize");
        assert_eq!(value["error"], "boom");
        assert_eq!(value["success"], false);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn descriptor_defaults_to_empty_object_schema() {
        let descriptor: ToolDescriptor =
            serde_json::from_value(json!({"name": "list_events"})).expect("descriptor");
        assert_eq!(descriptor.description, "");
        assert_eq!(descriptor.input_schema["type"], "object");
    }
}
