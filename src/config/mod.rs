//! Runtime configuration.
//!
//! Values are resolved in three layers: an optional TOML file
//! (`config/agent.toml` by default), then environment variables (optionally
//! seeded from a `.env` file), then command-line overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{RawConfig, ensure_env_loaded, load_config, resolve};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";
pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MCP_SERVER_URL: &str = "http://127.0.0.1:58426";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_MAX_TURNS: usize = 10;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_REASONING_EFFORT: &str = "OPENAI_REASONING_EFFORT";
pub const ENV_VERBOSITY: &str = "OPENAI_VERBOSITY";
pub const ENV_MCP_SERVER_URL: &str = "MCP_SERVER_URL";

/// Reasoning-effort hint forwarded to the Responses API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    #[default]
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasoningEffort::Minimal => "minimal",
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl FromStr for ReasoningEffort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err("expected one of minimal, low, medium, high".to_string()),
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output verbosity hint forwarded to the Responses API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    Low,
    Medium,
    High,
}

impl Verbosity {
    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Low => "low",
            Verbosity::Medium => "medium",
            Verbosity::High => "high",
        }
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err("expected one of low, medium, high".to_string()),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub reasoning_effort: ReasoningEffort,
    pub verbosity: Verbosity,
    pub request_timeout: Duration,
    pub mcp_server_url: String,
    pub max_iterations: usize,
    pub max_turns: usize,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("reasoning_effort", &self.reasoning_effort)
            .field("verbosity", &self.verbosity)
            .field("request_timeout", &self.request_timeout)
            .field("mcp_server_url", &self.mcp_server_url)
            .field("max_iterations", &self.max_iterations)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

/// Command-line overrides applied on top of file and environment values.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub mcp_server_url: Option<String>,
    pub model: Option<String>,
    pub max_iterations: Option<usize>,
    pub max_turns: Option<usize>,
}

impl AppConfig {
    /// Load configuration from a file path (or the default path if None)
    /// and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_config(path)
    }

    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(url) = &overrides.mcp_server_url {
            self.mcp_server_url = loader::validate_url("mcp_server_url", url)?;
        }
        if let Some(model) = &overrides.model {
            self.model = loader::validate_non_empty("model", model)?;
        }
        if let Some(max) = overrides.max_iterations {
            self.max_iterations = loader::validate_positive("max_iterations", max)?;
        }
        if let Some(max) = overrides.max_turns {
            self.max_turns = loader::validate_positive("max_turns", max)?;
        }
        Ok(self)
    }
}
