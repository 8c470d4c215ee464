use std::path::PathBuf;

use clap::{Args, Parser};

use crate::config::ConfigOverrides;

/// Flags shared by both agent binaries.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// TOML configuration file (defaults to config/agent.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Environment file loaded before reading configuration
    #[arg(long)]
    pub env_file: Option<PathBuf>,
    /// MCP server URL; a path ending in /sse selects the legacy SSE transport
    #[arg(long)]
    pub mcp_url: Option<String>,
    /// OpenAI model name
    #[arg(long)]
    pub model: Option<String>,
    /// Print the outcome as JSON (one-shot mode only)
    #[arg(long)]
    pub json: bool,
    /// Handle a single request and exit instead of starting the console
    #[arg()]
    pub prompt: Vec<String>,
}

impl CommonArgs {
    pub fn one_shot_request(&self) -> Option<String> {
        let request = self.prompt.join(" ");
        let request = request.trim();
        (!request.is_empty()).then(|| request.to_string())
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mcp_server_url: self.mcp_url.clone(),
            model: self.model.clone(),
            ..ConfigOverrides::default()
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "calendar-agent",
    version,
    about = "Google Calendar agent driving MCP tools through a JSON tool-calling loop"
)]
pub struct ManualCli {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Maximum model round trips per request
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

impl ManualCli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_iterations: self.max_iterations,
            ..self.common.overrides()
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "calendar-agent-runner",
    version,
    about = "Google Calendar agent using native function calling"
)]
pub struct RunnerCli {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Maximum model turns per request
    #[arg(long)]
    pub max_turns: Option<usize>,
}

impl RunnerCli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_turns: self.max_turns,
            ..self.common.overrides()
        }
    }
}
