//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use braincraft_chat::{DiagramAgent, SessionStore};
use braincraft_core::config::BraincraftConfig;
use braincraft_voice::VoiceService;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BraincraftConfig>,
    pub agent: Arc<DiagramAgent>,
    pub sessions: Arc<SessionStore>,
    /// `None` when voice is disabled or its provider keys are missing.
    pub voice: Option<Arc<VoiceService>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: BraincraftConfig, agent: DiagramAgent, voice: Option<VoiceService>) -> Self {
        let sessions = SessionStore::new(config.sessions.idle_timeout_minutes);
        Self {
            config: Arc::new(config),
            agent: Arc::new(agent),
            sessions: Arc::new(sessions),
            voice: voice.map(Arc::new),
            start_time: Instant::now(),
        }
    }
}
