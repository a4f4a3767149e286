//! Mistral chat-completions client.
//!
//! Calls the REST API directly with `reqwest`. No retries: a failed call is
//! reported once and classified by the caller.

use std::time::Duration;

use async_trait::async_trait;
use braincraft_core::config::ModelConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChatError, ModelError};
use crate::model::ModelClient;
use crate::types::Message;

/// [`ModelClient`] backed by the Mistral HTTP API.
#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

impl MistralClient {
    /// Build a client from configuration. A missing API key is a
    /// configuration error.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ChatError> {
        let api_key = config.require_api_key()?.to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ChatError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelClient for MistralClient {
    async fn invoke(&self, messages: &[Message]) -> Result<String, ModelError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        debug!(model = %self.model, messages = messages.len(), "Sending request to Mistral");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ModelError::Timeout(self.timeout_secs)
                } else {
                    ModelError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Mistral error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| ModelError::MalformedResponse(err.to_string()))?;

        let text = extract_text_response(parsed)?;
        debug!(chars = text.len(), "Received response from Mistral");
        Ok(text)
    }
}

/// Map a non-success HTTP status to a [`ModelError`].
fn map_http_error(status: StatusCode, body: String) -> ModelError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::Authentication {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => ModelError::RateLimited(body),
        _ => ModelError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, ModelError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ModelError::MalformedResponse("response contained no choices".to_string()))
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
