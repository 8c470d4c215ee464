use thiserror::Error;

use crate::application::console::ConsoleError;
use crate::application::tooling::RegistryError;
use crate::config::ConfigError;

/// Anything that ends a binary run with exit status 1.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tools(#[from] RegistryError),
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error("failed to render JSON output: {0}")]
    Output(#[from] serde_json::Error),
}

impl AppError {
    /// Text printed after `ERROR: ` by the binaries.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(err) => err.user_message(),
            AppError::Tools(err) => err.user_message(),
            AppError::Console(err) => err.user_message(),
            AppError::Output(err) => format!("Could not render the result as JSON: {err}"),
        }
    }
}
