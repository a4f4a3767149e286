//! BrainCraft API crate - axum HTTP server and route handlers.
//!
//! Exposes the diagram agent over JSON: conversational chat with per-session
//! history, direct generate/refine calls, session inspection, and optional
//! speech transcription and synthesis.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
