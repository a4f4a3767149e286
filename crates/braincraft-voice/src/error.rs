use braincraft_core::BraincraftError;
use thiserror::Error;

/// Errors from speech-to-text and text-to-speech calls.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("voice service not configured: {0}")]
    NotConfigured(String),

    #[error("voice request failed: {0}")]
    Transport(String),

    #[error("voice provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed voice response: {0}")]
    Malformed(String),
}

impl From<VoiceError> for BraincraftError {
    fn from(err: VoiceError) -> Self {
        BraincraftError::Voice(err.to_string())
    }
}
