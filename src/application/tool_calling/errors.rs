use crate::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("max turns ({max}) exceeded")]
    MaxTurnsExceeded { max: usize },
}

impl RunnerError {
    pub fn user_message(&self) -> String {
        match self {
            RunnerError::Model(err) => err.user_message(),
            RunnerError::MaxTurnsExceeded { max } => {
                format!("The agent did not finish within {max} turns.")
            }
        }
    }
}
