//! Tool registry loaded from the MCP server at startup.

mod error;
mod interface;
mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{RegistryError, ToolError};
pub use interface::ToolServerInterface;
pub use registry::{ToolFn, ToolFuture, ToolRegistry};
