//! Interactive console around either agent variant.

use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

use super::agent::{Agent, AgentDirective, AgentObserver, AgentOutcome, AgentStatus};
use super::tool_calling::ToolCallingAgent;
use crate::model::{FunctionCallingProvider, ModelProvider};
use crate::types::{FunctionCall, FunctionCallResult};

const PROMPT: &str = "Please enter your request: ";
const EXIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConsoleError {
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Io(err) => format!("Console input/output failed: {err}"),
        }
    }
}

fn separator() -> String {
    "=".repeat(70)
}

/// Line-oriented output shared between the session loop and the agent
/// observers.
#[derive(Clone)]
pub struct ConsoleWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl ConsoleWriter {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn write(&self, text: &str) -> Result<(), ConsoleError> {
        let mut writer = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("console writer poisoned"))?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn line(&self, text: &str) -> Result<(), ConsoleError> {
        self.write(&format!("{text}\n"))
    }

    /// For observer callbacks, which cannot return errors.
    fn emit(&self, text: &str) {
        if let Err(err) = self.line(text) {
            debug!(%err, "Dropped console output");
        }
    }
}

/// Handles one request read from the console.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    fn title(&self) -> &str;

    async fn handle(&self, request: &str, out: &ConsoleWriter) -> Result<(), ConsoleError>;
}

/// Startup listing of the tools the server offers.
pub fn announce_tools<'a>(
    out: &ConsoleWriter,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), ConsoleError> {
    let mut count = 0;
    for name in names {
        out.line(&format!("   ✓ Loaded tool: {name}"))?;
        count += 1;
    }
    out.line(&format!("\nLoaded {count} tools from MCP server\n"))
}

/// Reads requests until EOF or an exit word.
pub async fn run_session<R>(
    handler: &dyn RequestHandler,
    input: R,
    out: &ConsoleWriter,
) -> Result<(), ConsoleError>
where
    R: AsyncBufRead + Unpin,
{
    out.line(&separator())?;
    out.line(handler.title())?;
    out.line(&separator())?;
    out.line("Type 'exit' to quit, or press Ctrl+D\n")?;

    let mut lines = input.lines();
    loop {
        out.write(PROMPT)?;
        let Some(line) = lines.next_line().await? else {
            out.line("\n\nGoodbye!")?;
            break;
        };
        let request = line.trim();
        if EXIT_WORDS.contains(&request.to_lowercase().as_str()) {
            out.line("\nGoodbye!")?;
            break;
        }
        if request.is_empty() {
            out.line("Please enter a valid request.\n")?;
            continue;
        }

        out.line(&format!("\n{}\n", separator()))?;
        info!("Processing console request");
        handler.handle(request, out).await?;
    }
    Ok(())
}

/// Prints the manual loop's progress as it happens.
pub struct ConsoleObserver {
    out: ConsoleWriter,
}

impl ConsoleObserver {
    pub fn new(out: ConsoleWriter) -> Self {
        Self { out }
    }
}

impl AgentObserver for ConsoleObserver {
    fn iteration_started(&self, iteration: usize, max_iterations: usize) {
        self.out.emit(&format!(
            "\n{sep}\nITERATION {iteration}/{max_iterations}\n{sep}\n",
            sep = separator()
        ));
    }

    fn decision(&self, directive: &AgentDirective) {
        if directive.is_complete() {
            self.out.emit("No further action to perform.");
        }
        self.out
            .emit(&format!("REASONING:\n   {}\n", directive.reasoning));
        if !directive.is_complete() {
            self.out.emit(&render_actions(&directive.function_calls));
        }
    }

    fn tool_finished(&self, result: &FunctionCallResult) {
        match (&result.result, &result.error) {
            (Some(text), _) if result.success => {
                self.out.emit(&format!("RESULT:\n   {text}\n"));
            }
            (_, Some(error)) => self.out.emit(&format!("ERROR: {error}\n")),
            _ => {}
        }
    }

    fn finished(&self, outcome: &AgentOutcome) {
        match &outcome.status {
            AgentStatus::Done { .. } => self.out.emit("AGENT COMPLETED THE TASK\n"),
            AgentStatus::Failed(err) => {
                self.out.emit(&format!("\nERROR: {}\n", err.user_message()));
            }
        }
        self.out.emit(&format!("\n{}\n", separator()));
    }
}

fn render_actions(calls: &[FunctionCall]) -> String {
    let mut text = String::from("ACTION:\n");
    for (index, call) in calls.iter().enumerate() {
        if calls.len() > 1 {
            text.push_str(&format!("   Function Call {}:\n", index + 1));
        }
        let arguments = serde_json::to_string_pretty(&call.arguments)
            .unwrap_or_else(|_| "{}".to_string());
        text.push_str(&format!(
            "   Function: {}\n   Arguments: {arguments}\n",
            call.name
        ));
    }
    text
}

pub struct ManualConsole<P: ModelProvider> {
    agent: Agent<P>,
}

impl<P: ModelProvider> ManualConsole<P> {
    pub fn new(agent: Agent<P>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl<P: ModelProvider + 'static> RequestHandler for ManualConsole<P> {
    fn title(&self) -> &str {
        "Google Calendar Agent (manual tool calling)"
    }

    async fn handle(&self, request: &str, out: &ConsoleWriter) -> Result<(), ConsoleError> {
        let observer = ConsoleObserver::new(out.clone());
        let outcome = self.agent.run_with_observer(request, &observer).await;
        if let Some(err) = outcome.error() {
            error!(error = %err, "Agent request failed");
        }
        Ok(())
    }
}

pub struct RunnerConsole<P: FunctionCallingProvider> {
    agent: ToolCallingAgent<P>,
}

impl<P: FunctionCallingProvider> RunnerConsole<P> {
    pub fn new(agent: ToolCallingAgent<P>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl<P: FunctionCallingProvider + 'static> RequestHandler for RunnerConsole<P> {
    fn title(&self) -> &str {
        "Google Calendar Agent (function calling)"
    }

    async fn handle(&self, request: &str, out: &ConsoleWriter) -> Result<(), ConsoleError> {
        match self.agent.run(request).await {
            Ok(outcome) => {
                out.line(&format!("RESULT:\n   {}\n", outcome.final_output))?;
            }
            Err(err) => {
                error!(error = %err, "Runner request failed");
                out.line(&format!("ERROR: Agent execution failed: {}\n", err.user_message()))?;
            }
        }
        Ok(())
    }
}
