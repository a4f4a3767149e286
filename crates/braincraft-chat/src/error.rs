//! Error types for the diagram agent.

use braincraft_core::error::BraincraftError;

use crate::error_classifier::classify_error;

/// Failure of a single language-model call.
///
/// The `Display` text feeds the error classifier, so authentication and
/// rate-limit failures keep the markers it looks for.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("authentication failed ({status}): check MISTRAL_API_KEY")]
    Authentication { status: u16 },
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("model request timed out after {0}s")]
    Timeout(u64),
    #[error("model request failed: {0}")]
    Transport(String),
    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// Errors from the diagram agent.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("LLM error: {0}")]
    Model(#[from] ModelError),
    #[error("the model reply did not contain a mermaid diagram")]
    NoDiagram,
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
}

impl ChatError {
    /// User-facing text for this error, after classification.
    pub fn user_message(&self) -> String {
        classify_error(&self.to_string())
    }
}

impl From<BraincraftError> for ChatError {
    fn from(err: BraincraftError) -> Self {
        ChatError::Configuration(err.to_string())
    }
}

impl From<ChatError> for BraincraftError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Configuration(msg) => BraincraftError::Config(msg),
            other => BraincraftError::Api(other.to_string()),
        }
    }
}
