//! Native function-calling agent.

use calendar_agent::RunnerCli;
use clap::Parser;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = RunnerCli::parse();
    if let Err(err) = calendar_agent::run_runner(cli).await {
        eprintln!("ERROR: {}", err.user_message());
        std::process::exit(1);
    }
    Ok(())
}
