//! Text-to-speech through the LMNT speech endpoint.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use braincraft_core::config::VoiceConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::VoiceError;
use crate::TextToSpeech;

const AUDIO_FORMAT: &str = "mp3";

/// [`TextToSpeech`] backed by `POST {base}/v1/ai/speech`.
#[derive(Clone)]
pub struct LmntSpeech {
    client: Client,
    endpoint: String,
    api_key: String,
    voice: String,
}

impl LmntSpeech {
    pub fn from_config(config: &VoiceConfig) -> Result<Self, VoiceError> {
        let api_key = config
            .lmnt_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VoiceError::NotConfigured("LMNT_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/ai/speech", config.lmnt_base_url.trim_end_matches('/')),
            api_key,
            voice: config.voice.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextToSpeech for LmntSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::InvalidInput("text is empty".to_string()));
        }

        debug!(chars = text.len(), voice = %self.voice, "Requesting speech synthesis");

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-Key", &self.api_key)
            .json(&SpeechRequest {
                text,
                voice: &self.voice,
                format: AUDIO_FORMAT,
            })
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

        let parsed: SpeechResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Malformed(e.to_string()))?;
        decode_audio(&parsed)
    }
}

fn decode_audio(response: &SpeechResponse) -> Result<Vec<u8>, VoiceError> {
    BASE64_STANDARD
        .decode(response.audio.as_bytes())
        .map_err(|e| VoiceError::Malformed(format!("audio is not base64: {}", e)))
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    voice: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeechResponse {
    audio: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VoiceConfig {
        VoiceConfig {
            lmnt_api_key: Some("lmnt-key".to_string()),
            ..VoiceConfig::default()
        }
    }

    #[test]
    fn test_endpoint_and_voice() {
        let tts = LmntSpeech::from_config(&config()).unwrap();
        assert_eq!(tts.endpoint(), "https://api.lmnt.com/v1/ai/speech");
        assert_eq!(tts.voice, "lily");
    }

    #[test]
    fn test_missing_key() {
        assert!(matches!(
            LmntSpeech::from_config(&VoiceConfig::default()),
            Err(VoiceError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let json = serde_json::to_value(SpeechRequest {
            text: "hello",
            voice: "lily",
            format: AUDIO_FORMAT,
        })
        .unwrap();
        assert_eq!(json["text"], "hello");
        assert_eq!(json["voice"], "lily");
        assert_eq!(json["format"], "mp3");
    }

    #[test]
    fn test_decode_audio() {
        let parsed: SpeechResponse =
            serde_json::from_str(r#"{"audio":"aGVsbG8=","durations":[]}"#).unwrap();
        assert_eq!(decode_audio(&parsed).unwrap(), b"hello");

        let bad = SpeechResponse {
            audio: "not base64!".to_string(),
        };
        assert!(matches!(decode_audio(&bad), Err(VoiceError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_blank_text_rejected() {
        let tts = LmntSpeech::from_config(&config()).unwrap();
        assert!(matches!(
            tts.synthesize("  ").await,
            Err(VoiceError::InvalidInput(_))
        ));
    }
}
