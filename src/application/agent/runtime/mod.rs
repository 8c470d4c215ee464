mod execution;
mod instructions;
mod parser;

use std::sync::Arc;

use crate::application::tooling::ToolRegistry;

pub(super) use super::directive::AgentDirective;
pub(super) use super::errors::AgentError;
pub(super) use serde_json::Value;

pub use instructions::{follow_up_prompt, system_prompt};

/// The registry as seen by the agent loop: prompt rendering, output
/// validation against the registered names, and call dispatch.
pub(super) struct ToolRuntime {
    registry: Arc<ToolRegistry>,
}

impl ToolRuntime {
    pub(super) fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub(super) fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}
