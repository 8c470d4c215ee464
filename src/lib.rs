pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::{agent, console, tool_calling, tooling};
pub use cli::{CommonArgs, ManualCli, RunnerCli};
pub use config::AppConfig;
pub use domain::types;
pub use error::AppError;
pub use infrastructure::{mcp, model};

use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use agent::{Agent, AgentOptions};
use config::{ConfigOverrides, ensure_env_loaded};
use console::{
    ConsoleWriter, ManualConsole, RequestHandler, RunnerConsole, announce_tools, run_session,
};
use mcp::McpClient;
use model::OpenAIClient;
use tool_calling::ToolCallingAgent;
use tooling::{RegistryError, ToolRegistry, ToolServerInterface};

/// Entry point of the `calendar-agent` binary.
pub async fn run_manual(cli: ManualCli) -> Result<(), AppError> {
    init_tracing();
    debug!(?cli, "CLI arguments parsed");
    let config = load_config(&cli.common, &cli.overrides())?;
    let out = ConsoleWriter::stdout();
    let tools = ToolSession::connect(&config, &out, cli.common.json).await?;

    let provider = Arc::new(OpenAIClient::from_config(&config));
    info!(model = provider.model(), "Model provider ready");
    let agent = Agent::new(provider, Arc::clone(&tools.registry)).with_options(AgentOptions {
        max_iterations: config.max_iterations,
        reference_time: None,
    });

    let result: Result<(), AppError> = match cli.common.one_shot_request() {
        Some(request) if cli.common.json => {
            let outcome = agent.run(&request).await;
            out.line(&serde_json::to_string_pretty(&outcome.to_json())?)
                .map_err(Into::into)
        }
        Some(request) => ManualConsole::new(agent)
            .handle(&request, &out)
            .await
            .map_err(Into::into),
        None => run_session(
            &ManualConsole::new(agent),
            BufReader::new(tokio::io::stdin()),
            &out,
        )
        .await
        .map_err(Into::into),
    };
    tools.close().await;
    result
}

/// Entry point of the `calendar-agent-runner` binary.
pub async fn run_runner(cli: RunnerCli) -> Result<(), AppError> {
    init_tracing();
    debug!(?cli, "CLI arguments parsed");
    let config = load_config(&cli.common, &cli.overrides())?;
    let out = ConsoleWriter::stdout();
    let tools = ToolSession::connect(&config, &out, cli.common.json).await?;

    let provider = Arc::new(OpenAIClient::from_config(&config));
    info!(model = provider.model(), "Model provider ready");
    let agent = ToolCallingAgent::new(provider, Arc::clone(&tools.registry))
        .with_max_turns(config.max_turns);

    let result: Result<(), AppError> = match cli.common.one_shot_request() {
        Some(request) if cli.common.json => {
            let value = match agent.run(&request).await {
                Ok(outcome) => serde_json::json!({
                    "status": "done",
                    "turns": outcome.turns,
                    "message": outcome.final_output,
                    "results": outcome.results,
                }),
                Err(err) => serde_json::json!({
                    "status": "failed",
                    "error": err.to_string(),
                }),
            };
            out.line(&serde_json::to_string_pretty(&value)?)
                .map_err(Into::into)
        }
        Some(request) => RunnerConsole::new(agent)
            .handle(&request, &out)
            .await
            .map_err(Into::into),
        None => run_session(
            &RunnerConsole::new(agent),
            BufReader::new(tokio::io::stdin()),
            &out,
        )
        .await
        .map_err(Into::into),
    };
    tools.close().await;
    result
}

fn load_config(common: &CommonArgs, overrides: &ConfigOverrides) -> Result<AppConfig, AppError> {
    ensure_env_loaded(common.env_file.as_deref())?;
    let config = AppConfig::load(common.config.as_deref())?.apply_overrides(overrides)?;
    debug!(?config, "Configuration resolved");
    Ok(config)
}

/// The MCP connection and the registry built from it.
struct ToolSession {
    client: Arc<McpClient>,
    registry: Arc<ToolRegistry>,
}

impl ToolSession {
    async fn connect(
        config: &AppConfig,
        out: &ConsoleWriter,
        quiet: bool,
    ) -> Result<Self, AppError> {
        if !quiet {
            out.line("Loading tools from MCP server...")?;
            out.line(&format!("   Connecting to: {}", config.mcp_server_url))?;
        }
        let client = Arc::new(
            McpClient::connect(&config.mcp_server_url)
                .await
                .map_err(RegistryError::from)?,
        );
        let server: Arc<dyn ToolServerInterface> = client.clone();
        let registry = match ToolRegistry::load(server).await {
            Ok(registry) => registry,
            Err(err) => {
                client.close().await;
                return Err(err.into());
            }
        };
        info!(url = client.url(), tools = registry.len(), "Tool registry ready");
        if !quiet {
            announce_tools(out, registry.names())?;
        }
        Ok(Self {
            client,
            registry: Arc::new(registry),
        })
    }

    async fn close(&self) {
        self.client.close().await;
    }
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
