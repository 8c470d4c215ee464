use crate::types::FunctionCall;

/// A validated model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDirective {
    pub function_calls: Vec<FunctionCall>,
    pub reasoning: String,
}

impl AgentDirective {
    /// An empty call list means the model considers the request handled.
    pub fn is_complete(&self) -> bool {
        self.function_calls.is_empty()
    }
}
