//! BrainCraft application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration (file, then environment)
//! 2. Initialize tracing
//! 3. Build the diagram agent (aborts if the Mistral key is missing)
//! 4. Build the optional voice service and the session store
//! 5. Start the session purge task and the axum API server

mod cli;

use std::time::Duration;

use clap::Parser;

use braincraft_api::routes;
use braincraft_api::state::AppState;
use braincraft_chat::DiagramAgent;
use braincraft_core::config::BraincraftConfig;
use braincraft_voice::VoiceService;

use crate::cli::CliArgs;

/// How often idle sessions are swept.
const PURGE_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so the configured level applies; a
    // load failure is reported once the subscriber is up.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = match BraincraftConfig::load(&config_file) {
        Ok(config) => (config, None),
        Err(e) => (BraincraftConfig::default(), Some(e)),
    };
    config.apply_env_overrides();
    config.general.log_level = args.resolve_log_level(&config.general.log_level);
    config.server.port = args.resolve_port(config.server.port);
    config.server.host = args.resolve_host(&config.server.host);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting BrainCraft v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Could not load configuration file; using defaults"
        ),
    }

    // Agent. A missing key is fatal.
    let agent = match DiagramAgent::from_config(&config.model) {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize diagram agent");
            return Err(e.into());
        }
    };

    // Voice is optional.
    let voice = VoiceService::from_config(&config.voice);

    let state = AppState::new(config, agent, voice);

    // === Background tasks ===

    let sessions = std::sync::Arc::clone(&state.sessions);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(PURGE_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::info!(purged, remaining = sessions.len(), "Expired sessions purged");
            }
        }
    });

    // === API server ===

    routes::start_server(state).await?;

    Ok(())
}
