//! In-memory tool server used by unit tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::interface::ToolServerInterface;
use crate::infrastructure::mcp::McpError;
use crate::types::ToolDescriptor;

pub(crate) type CallLog = Arc<Mutex<Vec<(String, Value)>>>;

pub(crate) struct FakeToolServer {
    tools: Vec<ToolDescriptor>,
    responses: HashMap<String, Result<String, String>>,
    calls: CallLog,
    reachable: bool,
}

impl FakeToolServer {
    pub(crate) fn with_tools(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools,
            responses: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            reachable: true,
        }
    }

    pub(crate) fn calendar() -> Self {
        Self::with_tools(vec![
            ToolDescriptor::new("list_events", "List calendar events in a time range"),
            ToolDescriptor::new(
                "create_event",
                "Create a new calendar event with title, start time, and end time",
            ),
            ToolDescriptor::new("delete_event", "Delete a calendar event by id"),
        ])
    }

    pub(crate) fn unreachable() -> Self {
        let mut server = Self::with_tools(Vec::new());
        server.reachable = false;
        server
    }

    pub(crate) fn respond(mut self, tool: &str, response: Result<&str, &str>) -> Self {
        self.responses.insert(
            tool.to_string(),
            response.map(str::to_owned).map_err(str::to_owned),
        );
        self
    }

    pub(crate) fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ToolServerInterface for FakeToolServer {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
        if !self.reachable {
            return Err(McpError::transport("connection refused"));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<String, McpError> {
        self.calls.lock().await.push((name.to_string(), arguments));
        match self.responses.get(name) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(McpError::ToolFailed {
                tool: name.to_string(),
                message: message.clone(),
            }),
            None => Ok(format!("{name} ok")),
        }
    }
}
