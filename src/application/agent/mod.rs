//! # Agent Module
//!
//! The manual agent loop: the model is asked for a JSON object
//! `{"function_calls": [...], "reasoning": "..."}`, the requested calls are
//! dispatched through the [`ToolRegistry`](crate::application::tooling::ToolRegistry)
//! and their results are folded into the next prompt.
//!
//! ## Agent Loop
//!
//! 1. PROMPTING: build the system prompt and the (follow-up) user prompt
//! 2. AWAITING_RESPONSE: call the model, parse and validate its JSON
//! 3. EXECUTING_TOOLS: run every requested call, capturing failures
//! 4. Back to 1, until the model returns no calls (DONE) or the iteration
//!    cap is hit (FAILED). Malformed or invalid output fails immediately.

mod directive;
mod errors;
mod models;
mod observer;
mod runner;
mod runtime;


pub use directive::AgentDirective;
pub use errors::AgentError;
pub use models::{AgentOptions, AgentOutcome, AgentStatus, IterationRecord};
pub use observer::{AgentObserver, NoopObserver};
pub use runner::Agent;
pub use runtime::{follow_up_prompt, system_prompt};
