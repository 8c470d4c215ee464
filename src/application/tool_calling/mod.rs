//! Native function-calling runner.
//!
//! Every registry entry is offered to the model as a function tool. The model
//! decides when to call them; each turn's call outputs are sent back with the
//! previous response id until a turn produces no calls. That turn's text is
//! the final answer.

mod errors;
mod runner;


pub use errors::RunnerError;
pub use runner::{INSTRUCTIONS, RunOutcome, ToolCallingAgent};
