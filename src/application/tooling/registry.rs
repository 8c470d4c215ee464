use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::{RegistryError, ToolError};
use super::interface::ToolServerInterface;
use crate::types::ToolDescriptor;

pub type ToolFuture = BoxFuture<'static, Result<String, ToolError>>;
pub type ToolFn = Arc<dyn Fn(Value) -> ToolFuture + Send + Sync>;

/// Name → callable mapping, in the order the server advertised the tools.
#[derive(Default)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, ToolFn>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries the server once and wraps every tool in a forwarding callable.
    pub async fn load(server: Arc<dyn ToolServerInterface>) -> Result<Self, RegistryError> {
        let tools = server.list_tools().await?;
        let mut registry = Self::new();
        for descriptor in tools {
            let name = descriptor.name.clone();
            let server = Arc::clone(&server);
            let invoke: ToolFn = Arc::new(move |arguments: Value| {
                let server = Arc::clone(&server);
                let name = name.clone();
                async move {
                    server
                        .call_tool(&name, arguments)
                        .await
                        .map_err(|source| ToolError::Execution { tool: name, source })
                }
                .boxed()
            });
            registry.register(descriptor, invoke);
        }

        if registry.is_empty() {
            return Err(RegistryError::Empty);
        }
        info!(tools = registry.len(), "Loaded tools from MCP server");
        Ok(registry)
    }

    /// Adds a tool. Returns false, keeping the earlier entry, when the name
    /// is already taken.
    pub fn register(&mut self, descriptor: ToolDescriptor, invoke: ToolFn) -> bool {
        if self.index.contains_key(&descriptor.name) {
            warn!(tool = descriptor.name.as_str(), "Skipping duplicate tool name");
            return false;
        }
        debug!(tool = descriptor.name.as_str(), "Registered tool");
        self.index.insert(descriptor.name.clone(), invoke);
        self.descriptors.push(descriptor);
        true
    }

    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|tool| tool.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        let invoke = self
            .index
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!(tool = name, "Invoking tool");
        invoke(arguments).await
    }
}
