use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BraincraftError, Result};

/// Environment variable holding the Mistral credential.
pub const MISTRAL_API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Top-level configuration for BrainCraft.
///
/// Loaded from `~/.braincraft/config.toml` by default, then overlaid with
/// environment variables (credentials normally live only in the environment).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BraincraftConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
}

impl BraincraftConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BraincraftConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overlay values from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// Recognized: `MISTRAL_API_KEY`, `MISTRAL_MODEL`, `OPENAI_API_KEY`,
    /// `LMNT_API_KEY`, `BRAINCRAFT_PORT`. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(MISTRAL_API_KEY_ENV) {
            self.model.api_key = Some(key);
        }
        if let Some(model) = get("MISTRAL_MODEL") {
            self.model.model = model;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.voice.openai_api_key = Some(key);
        }
        if let Some(key) = get("LMNT_API_KEY") {
            self.voice.lmnt_api_key = Some(key);
        }
        if let Some(port) = get("BRAINCRAFT_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!(value = %port, "Ignoring invalid BRAINCRAFT_PORT"),
            }
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS (the frontend dev server by default).
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the Mistral-compatible chat completions API.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Per-request timeout; a timed-out call surfaces as a turn error.
    pub request_timeout_secs: u64,
    /// Longest accepted user message, in characters.
    pub max_message_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mistral.ai/v1".to_string(),
            model: "mistral-medium".to_string(),
            temperature: 0.7,
            request_timeout_secs: 60,
            max_message_length: 4000,
            api_key: None,
        }
    }
}

impl ModelConfig {
    /// Return the configured API key, or a configuration error.
    ///
    /// Agent construction calls this so a missing credential aborts startup
    /// instead of failing every turn.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(BraincraftError::Config(format!(
                "{} not found in environment variables",
                MISTRAL_API_KEY_ENV
            ))),
        }
    }
}

/// Speech input/output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled: bool,
    pub openai_base_url: String,
    pub transcription_model: String,
    pub lmnt_base_url: String,
    /// LMNT voice id used for synthesis.
    pub voice: String,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lmnt_api_key: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            transcription_model: "whisper-1".to_string(),
            lmnt_base_url: "https://api.lmnt.com".to_string(),
            voice: "lily".to_string(),
            request_timeout_secs: 60,
            openai_api_key: None,
            lmnt_api_key: None,
        }
    }
}

/// Conversation session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are replaced on next use.
    pub idle_timeout_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 60,
        }
    }
}
