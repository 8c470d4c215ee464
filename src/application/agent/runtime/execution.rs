use tracing::{info, warn};

use super::ToolRuntime;
use super::super::observer::AgentObserver;
use crate::types::{FunctionCall, FunctionCallResult};

impl ToolRuntime {
    /// Runs the calls in order. A failing call is recorded and the next one
    /// still runs.
    pub(in crate::application::agent) async fn execute(
        &self,
        calls: &[FunctionCall],
        observer: &dyn AgentObserver,
    ) -> Vec<FunctionCallResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            observer.tool_started(call);
            let result = match self
                .registry()
                .invoke(&call.name, call.arguments_value())
                .await
            {
                Ok(output) => {
                    info!(tool = call.name.as_str(), "Tool executed");
                    FunctionCallResult::success(call, output)
                }
                Err(err) => {
                    warn!(tool = call.name.as_str(), error = %err, "Tool execution failed");
                    FunctionCallResult::failure(call, err.to_string())
                }
            };
            observer.tool_finished(&result);
            results.push(result);
        }
        results
    }
}
