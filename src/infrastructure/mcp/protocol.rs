//! JSON-RPC 2.0 envelopes and the MCP result shapes this client consumes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::McpError;

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Value,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    pub fn into_result(self) -> Result<Value, McpError> {
        if let Some(error) = self.error {
            return Err(McpError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// True when `message` is the response (not a request or notification)
/// carrying request id `id`. Servers may echo ids as numbers or strings.
pub fn is_response_to(message: &Value, id: u64) -> bool {
    if message.get("method").is_some() {
        return false;
    }
    match message.get("id") {
        Some(Value::Number(number)) => number.as_u64() == Some(id),
        Some(Value::String(text)) => text == &id.to_string(),
        _ => false,
    }
}

/// Picks the response for `id` out of a JSON body that may be a single
/// message or a batch.
pub fn find_response(body: Value, id: u64) -> Option<Result<JsonRpcResponse, McpError>> {
    let candidate = match body {
        Value::Array(items) => items.into_iter().find(|item| is_response_to(item, id))?,
        single if is_response_to(&single, id) => single,
        _ => return None,
    };
    Some(serde_json::from_value(candidate).map_err(|source| McpError::InvalidJson { source }))
}

/// Reply to a request the server sent us. Only `ping` is supported.
pub fn server_request_reply(method: &str, id: Value) -> Value {
    if method == "ping" {
        return json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "result": {} });
    }
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": {
            "code": -32601,
            "message": format!("client does not implement method '{method}'"),
        },
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion", default)]
    pub protocol_version: Option<String>,
    #[serde(rename = "serverInfo", default)]
    pub server_info: Option<ServerInfo>,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<RemoteTool>,
    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(rename = "structuredContent", default)]
    pub structured_content: Option<Value>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Text of the first content item; otherwise the first item, the
    /// structured content, or the raw result rendered as JSON.
    pub fn text(&self, raw: &Value) -> String {
        match self.content.first() {
            Some(item) => match item.get("text").and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => item.to_string(),
            },
            None => match &self.structured_content {
                Some(structured) => structured.to_string(),
                None => raw.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_numeric_and_string_ids() {
        assert!(is_response_to(&json!({"jsonrpc": "2.0", "id": 7, "result": {}}), 7));
        assert!(is_response_to(&json!({"jsonrpc": "2.0", "id": "7", "result": {}}), 7));
        assert!(!is_response_to(&json!({"jsonrpc": "2.0", "id": 8, "result": {}}), 7));
    }

    #[test]
    fn server_requests_are_not_responses() {
        let ping = json!({"jsonrpc": "2.0", "id": 7, "method": "ping"});
        assert!(!is_response_to(&ping, 7));
    }

    #[test]
    fn answers_ping_and_rejects_other_server_requests() {
        let pong = server_request_reply("ping", json!(4));
        assert_eq!(pong, json!({"jsonrpc": "2.0", "id": 4, "result": {}}));

        let refused = server_request_reply("sampling/createMessage", json!("s-1"));
        assert_eq!(refused["id"], "s-1");
        assert_eq!(refused["error"]["code"], -32601);
        assert!(refused.get("result").is_none());
    }

    #[test]
    fn finds_response_inside_batch() {
        let batch = json!([
            {"jsonrpc": "2.0", "method": "notifications/message", "params": {}},
            {"jsonrpc": "2.0", "id": 3, "result": {"ok": true}}
        ]);
        let response = find_response(batch, 3).expect("present").expect("valid");
        assert_eq!(response.into_result().expect("result")["ok"], true);
    }

    #[test]
    fn rpc_error_is_surfaced() {
        let response: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "bad params"}
        }))
        .expect("parse");
        let err = response.into_result().expect_err("error");
        assert!(matches!(err, McpError::Rpc { code: -32602, .. }));
    }

    #[test]
    fn tool_text_prefers_first_text_item() {
        let raw = json!({"content": [{"type": "text", "text": "Event created"}, {"type": "text", "text": "ignored"}]});
        let result: CallToolResult = serde_json::from_value(raw.clone()).expect("parse");
        assert_eq!(result.text(&raw), "Event created");
    }

    #[test]
    fn tool_text_falls_back_to_json() {
        let raw = json!({"content": [{"type": "image", "data": "AA=="}]});
        let result: CallToolResult = serde_json::from_value(raw.clone()).expect("parse");
        assert_eq!(result.text(&raw), r#"{"data":"AA==","type":"image"}"#);

        let empty = json!({"content": []});
        let result: CallToolResult = serde_json::from_value(empty.clone()).expect("parse");
        assert_eq!(result.text(&empty), r#"{"content":[]}"#);
    }
}
