//! Speech-to-text through the OpenAI transcription endpoint.

use std::time::Duration;

use async_trait::async_trait;
use braincraft_core::config::VoiceConfig;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::VoiceError;
use crate::SpeechToText;

/// Upload name for recorded audio. The provider infers the codec from it.
const UPLOAD_FILE_NAME: &str = "audio.wav";

/// [`SpeechToText`] backed by `POST {base}/audio/transcriptions`.
#[derive(Clone)]
pub struct OpenAiWhisper {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiWhisper {
    pub fn from_config(config: &VoiceConfig) -> Result<Self, VoiceError> {
        let api_key = config
            .openai_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VoiceError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/audio/transcriptions",
                config.openai_base_url.trim_end_matches('/')
            ),
            api_key,
            model: config.transcription_model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechToText for OpenAiWhisper {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, VoiceError> {
        if audio.is_empty() {
            return Err(VoiceError::InvalidInput("audio is empty".to_string()));
        }

        debug!(bytes = audio.len(), model = %self.model, "Sending audio for transcription");

        let file = Part::bytes(audio)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("audio/wav")
            .map_err(|e| VoiceError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Malformed(e.to_string()))?;
        debug!(chars = parsed.text.len(), "Transcription received");
        Ok(parsed.text)
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}
