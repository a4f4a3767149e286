//! BrainCraft voice crate: speech input and spoken replies.
//!
//! Two provider seams, [`SpeechToText`] and [`TextToSpeech`], with HTTP
//! implementations and in-memory mocks. [`VoiceService`] wraps a pair of
//! them and speaks base64 on the outside, which is what the HTTP API carries.

pub mod error;
pub mod lmnt;
pub mod openai;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use braincraft_core::config::VoiceConfig;
use tracing::{debug, info, warn};

pub use error::VoiceError;
pub use lmnt::LmntSpeech;
pub use openai::OpenAiWhisper;

// =============================================================================
// Traits
// =============================================================================

/// Turns recorded audio into text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, VoiceError>;
}

/// Turns text into encoded audio bytes.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError>;
}

// =============================================================================
// Service
// =============================================================================

/// Speech-to-text plus text-to-speech behind base64 payloads.
#[derive(Clone)]
pub struct VoiceService {
    stt: Arc<dyn SpeechToText>,
    tts: Arc<dyn TextToSpeech>,
}

impl VoiceService {
    pub fn new(stt: Arc<dyn SpeechToText>, tts: Arc<dyn TextToSpeech>) -> Self {
        Self { stt, tts }
    }

    /// Build the HTTP-backed service, or `None` when voice is disabled or a
    /// provider key is missing.
    pub fn from_config(config: &VoiceConfig) -> Option<Self> {
        if !config.enabled {
            info!("Voice endpoints disabled by configuration");
            return None;
        }

        let stt = OpenAiWhisper::from_config(config);
        let tts = LmntSpeech::from_config(config);
        match (stt, tts) {
            (Ok(stt), Ok(tts)) => {
                info!(voice = %config.voice, "Voice service ready");
                Some(Self::new(Arc::new(stt), Arc::new(tts)))
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Voice endpoints unavailable: {}", e);
                None
            }
        }
    }

    /// Decode base64 audio and transcribe it.
    pub async fn transcribe_base64(&self, audio_base64: &str) -> Result<String, VoiceError> {
        let audio = BASE64_STANDARD
            .decode(audio_base64.trim().as_bytes())
            .map_err(|e| VoiceError::InvalidInput(format!("audio is not valid base64: {}", e)))?;
        if audio.is_empty() {
            return Err(VoiceError::InvalidInput("audio is empty".to_string()));
        }
        debug!(bytes = audio.len(), "Transcribing audio");
        self.stt.transcribe(audio).await
    }

    /// Synthesize speech and return it base64-encoded.
    pub async fn synthesize_base64(&self, text: &str) -> Result<String, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::InvalidInput("text is empty".to_string()));
        }
        let audio = self.tts.synthesize(text).await?;
        debug!(bytes = audio.len(), "Synthesized speech");
        Ok(BASE64_STANDARD.encode(audio))
    }
}

// =============================================================================
// Mock implementations
// =============================================================================

/// Speech-to-text mock returning a fixed transcript.
#[derive(Debug)]
pub struct MockSpeechToText {
    transcript: String,
    received: Mutex<Vec<usize>>,
}

impl MockSpeechToText {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Byte lengths of every audio payload received.
    pub fn received(&self) -> Vec<usize> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for MockSpeechToText {
    fn default() -> Self {
        Self::new("[mock transcription]")
    }
}

#[async_trait]
impl SpeechToText for MockSpeechToText {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, VoiceError> {
        if audio.is_empty() {
            return Err(VoiceError::InvalidInput("audio is empty".to_string()));
        }
        if let Ok(mut received) = self.received.lock() {
            received.push(audio.len());
        }
        Ok(self.transcript.clone())
    }
}

/// Text-to-speech mock that "speaks" the UTF-8 bytes of the text.
#[derive(Debug, Clone, Default)]
pub struct MockTextToSpeech;

#[async_trait]
impl TextToSpeech for MockTextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        Ok(text.as_bytes().to_vec())
    }
}

impl VoiceService {
    /// Service wired to the mocks.
    pub fn mock(transcript: impl Into<String>) -> Self {
        Self::new(
            Arc::new(MockSpeechToText::new(transcript)),
            Arc::new(MockTextToSpeech),
        )
    }
}
