use crate::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("failed to parse model response as JSON: {source}")]
    MalformedJson {
        content: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
    #[error("reached maximum iterations ({max}) without completing the request")]
    IterationLimit { max: usize },
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(err) => err.user_message(),
            AgentError::MalformedJson { .. } => {
                "The model answered with something that is not JSON.".to_string()
            }
            AgentError::InvalidResponse(reason) => {
                format!("The model answer did not follow the expected format: {reason}")
            }
            AgentError::IterationLimit { max } => {
                format!("Reached maximum iterations ({max})")
            }
        }
    }
}
