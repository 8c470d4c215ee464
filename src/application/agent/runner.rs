use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::directive::AgentDirective;
use super::errors::AgentError;
use super::models::{AgentOptions, AgentOutcome, AgentStatus, IterationRecord};
use super::observer::{AgentObserver, NoopObserver};
use super::runtime::{ToolRuntime, follow_up_prompt, system_prompt};
use crate::application::tooling::ToolRegistry;
use crate::model::{ModelProvider, ModelRequest};
use crate::types::{ChatMessage, FunctionCallResult};

enum LoopState {
    Prompting,
    AwaitingResponse(Vec<ChatMessage>),
    ExecutingTools(AgentDirective),
    Done(String),
    Failed(AgentError),
}

pub struct Agent<P: ModelProvider> {
    provider: Arc<P>,
    runtime: ToolRuntime,
    options: AgentOptions,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: Arc<P>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            runtime: ToolRuntime::new(registry),
            options: AgentOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub async fn run(&self, request: &str) -> AgentOutcome {
        self.run_with_observer(request, &NoopObserver).await
    }

    /// Drives one request to DONE or FAILED. The model is called at most
    /// `max_iterations` times; tool failures never end the loop.
    pub async fn run_with_observer(
        &self,
        request: &str,
        observer: &dyn AgentObserver,
    ) -> AgentOutcome {
        let max_iterations = self.options.max_iterations;
        let now = self
            .options
            .reference_time
            .unwrap_or_else(|| Local::now().naive_local());
        let system = system_prompt(self.runtime.registry(), now);

        info!(max_iterations, "Agent run started");
        let mut state = LoopState::Prompting;
        let mut iteration = 0;
        let mut history: Vec<IterationRecord> = Vec::new();
        let mut results: Vec<FunctionCallResult> = Vec::new();

        let status = loop {
            state = match state {
                LoopState::Prompting => {
                    if iteration >= max_iterations {
                        warn!(max_iterations, "Agent reached maximum iterations");
                        LoopState::Failed(AgentError::IterationLimit {
                            max: max_iterations,
                        })
                    } else {
                        iteration += 1;
                        observer.iteration_started(iteration, max_iterations);
                        let prompt = if history.is_empty() {
                            request.to_string()
                        } else {
                            follow_up_prompt(request, &history)
                        };
                        LoopState::AwaitingResponse(vec![
                            ChatMessage::system(system.clone()),
                            ChatMessage::user(format!("User request: {prompt}")),
                        ])
                    }
                }
                LoopState::AwaitingResponse(messages) => {
                    debug!(iteration, "Submitting agent turn to model provider");
                    match self.provider.chat(ModelRequest::new(messages)).await {
                        Err(err) => LoopState::Failed(err.into()),
                        Ok(response) => match self.runtime.parse_directive(&response.content) {
                            Err(err) => LoopState::Failed(err),
                            Ok(directive) => {
                                observer.decision(&directive);
                                if directive.is_complete() {
                                    LoopState::Done(directive.reasoning)
                                } else {
                                    LoopState::ExecutingTools(directive)
                                }
                            }
                        },
                    }
                }
                LoopState::ExecutingTools(directive) => {
                    info!(
                        iteration,
                        calls = directive.function_calls.len(),
                        "Executing requested function calls"
                    );
                    let executed = self
                        .runtime
                        .execute(&directive.function_calls, observer)
                        .await;
                    results.extend(executed.iter().cloned());
                    history.push(IterationRecord {
                        iteration,
                        actions: directive.function_calls,
                        results: executed,
                    });
                    LoopState::Prompting
                }
                LoopState::Done(message) => {
                    info!(iteration, "Agent completed the request");
                    break AgentStatus::Done { message };
                }
                LoopState::Failed(err) => {
                    warn!(iteration, error = %err, "Agent run failed");
                    break AgentStatus::Failed(err);
                }
            };
        };

        let outcome = AgentOutcome {
            status,
            iterations: iteration,
            results,
        };
        observer.finished(&outcome);
        outcome
    }
}
