use super::directive::AgentDirective;
use super::models::AgentOutcome;
use crate::types::{FunctionCall, FunctionCallResult};

/// Progress hooks, called synchronously from the loop.
pub trait AgentObserver: Send + Sync {
    fn iteration_started(&self, _iteration: usize, _max_iterations: usize) {}

    fn decision(&self, _directive: &AgentDirective) {}

    fn tool_started(&self, _call: &FunctionCall) {}

    fn tool_finished(&self, _result: &FunctionCallResult) {}

    fn finished(&self, _outcome: &AgentOutcome) {}
}

pub struct NoopObserver;

impl AgentObserver for NoopObserver {}
