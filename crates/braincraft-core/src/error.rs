use thiserror::Error;

/// Top-level error type for BrainCraft.
///
/// Subsystem crates keep their own error enums and convert into this one at
/// the composition root, so `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BraincraftError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Voice error: {0}")]
    Voice(String),
}

impl From<toml::de::Error> for BraincraftError {
    fn from(err: toml::de::Error) -> Self {
        BraincraftError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for BraincraftError {
    fn from(err: toml::ser::Error) -> Self {
        BraincraftError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for BraincraftError {
    fn from(err: serde_json::Error) -> Self {
        BraincraftError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for BrainCraft operations.
pub type Result<T> = std::result::Result<T, BraincraftError>;
