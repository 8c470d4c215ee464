pub mod agent;
pub mod console;
pub mod tool_calling;
pub mod tooling;
