use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Value, json};

use super::errors::AgentError;
use crate::config::DEFAULT_MAX_ITERATIONS;
use crate::types::{FunctionCall, FunctionCallResult};

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub max_iterations: usize,
    /// Time shown to the model as "now"; the local clock when unset.
    pub reference_time: Option<NaiveDateTime>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            reference_time: None,
        }
    }
}

/// Actions and results of one completed EXECUTING_TOOLS pass.
#[derive(Debug, Clone, Serialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub actions: Vec<FunctionCall>,
    pub results: Vec<FunctionCallResult>,
}

#[derive(Debug)]
pub enum AgentStatus {
    Done { message: String },
    Failed(AgentError),
}

#[derive(Debug)]
pub struct AgentOutcome {
    pub status: AgentStatus,
    pub iterations: usize,
    pub results: Vec<FunctionCallResult>,
}

impl AgentOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self.status, AgentStatus::Done { .. })
    }

    /// The model's closing message when the loop completed.
    pub fn final_message(&self) -> Option<&str> {
        match &self.status {
            AgentStatus::Done { message } => Some(message),
            AgentStatus::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&AgentError> {
        match &self.status {
            AgentStatus::Done { .. } => None,
            AgentStatus::Failed(err) => Some(err),
        }
    }

    pub fn to_json(&self) -> Value {
        let (status, message, error) = match &self.status {
            AgentStatus::Done { message } => ("done", Some(message.clone()), None),
            AgentStatus::Failed(err) => ("failed", None, Some(err.to_string())),
        };
        json!({
            "status": status,
            "iterations": self.iterations,
            "message": message,
            "error": error,
            "results": self.results,
        })
    }
}
