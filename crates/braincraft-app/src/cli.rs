//! CLI argument definitions for the BrainCraft server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// BrainCraft: a conversational agent that turns requests into Mermaid diagrams.
#[derive(Parser, Debug)]
#[command(name = "braincraft", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Address to bind the API server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > BRAINCRAFT_CONFIG env var > ~/.braincraft/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_from(|key| std::env::var(key).ok())
    }

    fn resolve_config_path_from<F>(&self, lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = lookup("BRAINCRAFT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path(lookup("HOME"))
    }

    /// Resolve the API server port. Env and config are already merged into
    /// `config_port`, so only the flag can override it.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.port.unwrap_or(config_port)
    }

    pub fn resolve_host(&self, config_host: &str) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| config_host.to_string())
    }

    /// Resolve the log level: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn default_config_path(home: Option<String>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(home).join(".braincraft").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}
