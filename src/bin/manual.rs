//! Manual JSON tool-calling agent.

use calendar_agent::ManualCli;
use clap::Parser;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = ManualCli::parse();
    if let Err(err) = calendar_agent::run_manual(cli).await {
        eprintln!("ERROR: {}", err.user_message());
        std::process::exit(1);
    }
    Ok(())
}
