use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::errors::RunnerError;
use crate::application::tooling::{ToolError, ToolRegistry};
use crate::config::DEFAULT_MAX_TURNS;
use crate::model::{FunctionCallingProvider, RequestedCall, ToolTurnRequest, TurnInput};
use crate::types::{FunctionCall, FunctionCallResult};

pub const INSTRUCTIONS: &str = "You are managing a Google Calendar for a user. Act according to their latest request.

Your workflow:
1. Analyze the user request and current context
2. Decide which functions to call
3. After execution, you'll receive results
4. Based on results, decide if more actions are needed
5. If more actions are needed, repeat the process
6. If no more actions are needed, return the final result

Always be thorough and ensure the user's request is fully completed.";

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub final_output: String,
    pub turns: usize,
    pub results: Vec<FunctionCallResult>,
}

pub struct ToolCallingAgent<P: FunctionCallingProvider> {
    provider: Arc<P>,
    registry: Arc<ToolRegistry>,
    max_turns: usize,
}

impl<P: FunctionCallingProvider> ToolCallingAgent<P> {
    pub fn new(provider: Arc<P>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            registry,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub async fn run(&self, request: &str) -> Result<RunOutcome, RunnerError> {
        let tools = self.registry.descriptors().to_vec();
        let mut input = vec![TurnInput::User(request.to_string())];
        let mut previous_response_id = None;
        let mut results = Vec::new();

        info!(max_turns = self.max_turns, "Runner started");
        for turn in 1..=self.max_turns {
            debug!(turn, "Requesting model turn");
            let response = self
                .provider
                .respond(ToolTurnRequest {
                    instructions: INSTRUCTIONS.to_string(),
                    input: std::mem::take(&mut input),
                    tools: tools.clone(),
                    previous_response_id: previous_response_id.take(),
                })
                .await?;

            if response.calls.is_empty() {
                info!(turn, "Runner produced final output");
                return Ok(RunOutcome {
                    final_output: response.text,
                    turns: turn,
                    results,
                });
            }

            for call in response.calls {
                let result = self.execute(&call).await;
                let output = match (&result.result, &result.error) {
                    (Some(text), _) => text.clone(),
                    (None, Some(error)) => error.clone(),
                    (None, None) => String::new(),
                };
                input.push(TurnInput::FunctionCallOutput {
                    call_id: call.call_id,
                    output,
                });
                results.push(result);
            }
            previous_response_id = Some(response.response_id);
        }

        warn!(max_turns = self.max_turns, "Runner exceeded max turns");
        Err(RunnerError::MaxTurnsExceeded {
            max: self.max_turns,
        })
    }

    /// Failures are returned to the model as `Error calling <name>: <reason>`.
    async fn execute(&self, requested: &RequestedCall) -> FunctionCallResult {
        let arguments = match parse_arguments(&requested.arguments) {
            Ok(arguments) => arguments,
            Err(reason) => {
                let call = FunctionCall {
                    name: requested.name.clone(),
                    arguments: Map::new(),
                };
                warn!(tool = requested.name.as_str(), %reason, "Malformed tool arguments");
                return FunctionCallResult::failure(
                    &call,
                    format!("Error calling {}: {reason}", requested.name),
                );
            }
        };
        let call = FunctionCall {
            name: requested.name.clone(),
            arguments,
        };

        match self
            .registry
            .invoke(&call.name, call.arguments_value())
            .await
        {
            Ok(output) => {
                info!(tool = call.name.as_str(), "Tool executed");
                FunctionCallResult::success(&call, output)
            }
            Err(err) => {
                warn!(tool = call.name.as_str(), error = %err, "Tool execution failed");
                let reason = match err {
                    ToolError::Execution { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                FunctionCallResult::failure(&call, format!("Error calling {}: {reason}", call.name))
            }
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Map<String, Value>, String> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(_) => Err("arguments must be a JSON object".to_string()),
        Err(err) => Err(format!("invalid JSON arguments: {err}")),
    }
}
