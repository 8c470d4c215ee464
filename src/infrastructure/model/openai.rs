//! OpenAI Responses API client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::adapter::MessageAdapter;
use super::base::HttpClientBase;
use super::traits::{FunctionCallingProvider, ModelProvider};
use super::types::{
    ModelError, ModelRequest, ModelResponse, RequestedCall, ToolTurnRequest, ToolTurnResponse,
};
use crate::config::{AppConfig, ReasoningEffort, Verbosity};

const PROVIDER_ID: &str = "openai";
const RESPONSES_PATH: &str = "/v1/responses";

#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
    model: String,
    reasoning_effort: ReasoningEffort,
    verbosity: Verbosity,
}

impl OpenAIClient {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base: HttpClientBase::new(
                PROVIDER_ID.to_string(),
                config.openai_base_url.clone(),
                Some(config.api_key.clone()),
                config.request_timeout,
            ),
            model: config.model.clone(),
            reasoning_effort: config.reasoning_effort,
            verbosity: config.verbosity,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn create(&self, payload: &ResponsesRequest<'_>) -> Result<ParsedResponse, ModelError> {
        let url = self.base.build_url(RESPONSES_PATH);
        let response: ResponsesApiResponse = self.base.post_with_bearer(&url, payload).await?;
        debug!(response_id = response.id.as_str(), "Received response from OpenAI");
        response.parse(&self.base.id)
    }
}

#[async_trait]
impl ModelProvider for OpenAIClient {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let payload = ResponsesRequest {
            model: &self.model,
            instructions: None,
            input: MessageAdapter::to_input_messages(&request.messages),
            reasoning: ReasoningParam {
                effort: self.reasoning_effort,
            },
            text: TextParam {
                verbosity: self.verbosity,
                format: Some(FormatParam {
                    kind: "json_object",
                }),
            },
            tools: Vec::new(),
            previous_response_id: None,
        };

        info!(
            model = self.model.as_str(),
            messages = request.messages.len(),
            "Sending JSON-mode request to OpenAI"
        );
        let parsed = self.create(&payload).await?;
        if parsed.text.trim().is_empty() {
            return Err(ModelError::invalid_response(&self.base.id, "empty output text"));
        }
        Ok(ModelResponse::new(parsed.text))
    }
}

#[async_trait]
impl FunctionCallingProvider for OpenAIClient {
    async fn respond(&self, request: ToolTurnRequest) -> Result<ToolTurnResponse, ModelError> {
        let payload = ResponsesRequest {
            model: &self.model,
            instructions: Some(&request.instructions),
            input: MessageAdapter::to_input_items(&request.input),
            reasoning: ReasoningParam {
                effort: self.reasoning_effort,
            },
            text: TextParam {
                verbosity: self.verbosity,
                format: None,
            },
            tools: MessageAdapter::to_function_tools(&request.tools),
            previous_response_id: request.previous_response_id.as_deref(),
        };

        info!(
            model = self.model.as_str(),
            items = request.input.len(),
            tools = request.tools.len(),
            "Sending function-calling turn to OpenAI"
        );
        let parsed = self.create(&payload).await?;
        Ok(ToolTurnResponse {
            response_id: parsed.id,
            text: parsed.text,
            calls: parsed.calls,
        })
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
    input: Vec<Value>,
    reasoning: ReasoningParam,
    text: TextParam,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
}

#[derive(Serialize)]
struct ReasoningParam {
    effort: ReasoningEffort,
}

#[derive(Serialize)]
struct TextParam {
    verbosity: Verbosity,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<FormatParam>,
}

#[derive(Serialize)]
struct FormatParam {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ResponsesApiResponse {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<ResponseErrorBody>,
    #[serde(default)]
    incomplete_details: Option<Value>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct ResponseErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    FunctionCall {
        call_id: String,
        name: String,
        #[serde(default)]
        arguments: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    OutputText { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

struct ParsedResponse {
    id: String,
    text: String,
    calls: Vec<RequestedCall>,
}

impl ResponsesApiResponse {
    fn parse(self, provider: &str) -> Result<ParsedResponse, ModelError> {
        if let Some(error) = self.error {
            return Err(ModelError::invalid_response(provider, error.message));
        }
        match self.status.as_deref() {
            Some(status @ ("failed" | "cancelled")) => {
                return Err(ModelError::invalid_response(
                    provider,
                    format!("response status '{status}'"),
                ));
            }
            Some("incomplete") => {
                let reason = self
                    .incomplete_details
                    .as_ref()
                    .and_then(|details| details.get("reason"))
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                return Err(ModelError::invalid_response(
                    provider,
                    format!("response incomplete: {reason}"),
                ));
            }
            _ => {}
        }

        let mut text = String::new();
        let mut calls = Vec::new();
        for item in self.output {
            match item {
                OutputItem::Message { content } => {
                    for part in content {
                        match part {
                            ContentPart::OutputText { text: chunk } => text.push_str(&chunk),
                            ContentPart::Refusal { refusal } => {
                                return Err(ModelError::invalid_response(
                                    provider,
                                    format!("model refused: {refusal}"),
                                ));
                            }
                            ContentPart::Other => {}
                        }
                    }
                }
                OutputItem::FunctionCall {
                    call_id,
                    name,
                    arguments,
                } => calls.push(RequestedCall {
                    call_id,
                    name,
                    arguments,
                }),
                OutputItem::Other => {}
            }
        }

        Ok(ParsedResponse {
            id: self.id,
            text,
            calls,
        })
    }
}
