//! Route handler functions for all API endpoints.
//!
//! Handlers extract JSON bodies and path parameters, call into the agent,
//! session store or voice service held by [`AppState`], and return JSON.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use braincraft_chat::{ChatTurnResult, DiagramResult, Message, SessionSummary, TurnStatus};
use braincraft_voice::VoiceService;

use crate::error::ApiError;
use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SERVICE_NAME: &str = "BrainCraft API";

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Continue this session. Absent, unknown or expired ids start a new one.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of POST /api/generate. The frontend sends `message`; `description`
/// is accepted as well.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub current_code: String,
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    pub audio_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub docs_url: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
    pub voice_enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointDoc {
    pub method: String,
    pub path: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocsResponse {
    pub service: String,
    pub version: String,
    pub endpoints: Vec<EndpointDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiagramData {
    pub code: String,
    #[serde(rename = "type")]
    pub diagram_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<DiagramData>,
    /// Absent when the message was rejected before any session existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

impl ChatResponse {
    fn from_turn(turn: ChatTurnResult, session_id: Option<Uuid>) -> Self {
        let status = match turn.status {
            TurnStatus::Success => "success",
            TurnStatus::Error => "error",
        };
        Self {
            response: turn.response_text,
            status: status.to_string(),
            diagram: turn.diagram.map(|d| DiagramData {
                code: d.diagram_code,
                diagram_type: d.diagram_type.as_str().to_string(),
            }),
            session_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiagramResponse {
    pub diagram_code: String,
    pub diagram_type: String,
    pub explanation: String,
}

impl From<DiagramResult> for DiagramResponse {
    fn from(result: DiagramResult) -> Self {
        Self {
            diagram_code: result.diagram_code,
            diagram_type: result.diagram_type.as_str().to_string(),
            explanation: result.explanation,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AudioResponse {
    pub audio_base64: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionHistoryResponse {
    pub session_id: Uuid,
    pub messages: Vec<Message>,
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET / - welcome message.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to BrainCraft API".to_string(),
        docs_url: "/docs".to_string(),
        version: VERSION.to_string(),
    })
}

/// GET /docs - endpoint index.
pub async fn docs() -> Json<DocsResponse> {
    let endpoints = [
        ("GET", "/api/health", "Service health"),
        ("POST", "/api/chat", "Conversational turn; may return a diagram"),
        ("POST", "/api/generate", "Generate a diagram from a description"),
        ("POST", "/api/refine", "Refine diagram code with feedback"),
        ("POST", "/api/transcribe", "Transcribe base64 audio to text"),
        ("POST", "/api/synthesize", "Synthesize speech as base64 audio"),
        ("GET", "/api/sessions", "List active sessions"),
        ("GET", "/api/sessions/{id}", "Message history of a session"),
        ("DELETE", "/api/sessions/{id}", "End a session"),
    ];
    Json(DocsResponse {
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        endpoints: endpoints
            .iter()
            .map(|(method, path, description)| EndpointDoc {
                method: method.to_string(),
                path: path.to_string(),
                description: description.to_string(),
            })
            .collect(),
    })
}

/// GET /api/health - service health.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.sessions.len(),
        voice_enabled: state.voice.is_some(),
    })
}

/// POST /api/chat - one conversation turn.
///
/// Turn failures are reported in the body with `status: "error"`, not as
/// HTTP errors.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let requested = match request.session_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::BadRequest(format!("Invalid session_id '{}'", raw)))?,
        ),
    };

    // Rejected messages never reach the store, so they cannot create sessions.
    if let Err(e) = state.agent.validate(&request.message) {
        debug!(error = %e, "Chat message rejected");
        let session_id = requested.filter(|id| state.sessions.get(*id).is_some());
        return Ok(Json(ChatResponse::from_turn(
            ChatTurnResult::error(&e.user_message()),
            session_id,
        )));
    }

    let (session_id, session) = state.sessions.get_or_create(requested).await;
    let mut guard = session.lock().await;
    let turn = state.agent.chat(&mut guard, &request.message).await;
    drop(guard);

    info!(session_id = %session_id, status = ?turn.status, "Chat request handled");
    Ok(Json(ChatResponse::from_turn(turn, Some(session_id))))
}

/// POST /api/generate - diagram from a description.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<DiagramResponse>, ApiError> {
    let description = request
        .description
        .or(request.message)
        .ok_or_else(|| ApiError::BadRequest("Field 'description' is required".to_string()))?;

    let result = state.agent.generate_diagram(&description).await?;
    info!(diagram_type = %result.diagram_type, "Diagram generated");
    Ok(Json(result.into()))
}

/// POST /api/refine - improve existing diagram code.
pub async fn refine(
    State(state): State<AppState>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<DiagramResponse>, ApiError> {
    if request.current_code.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Field 'current_code' must not be empty".to_string(),
        ));
    }

    let result = state
        .agent
        .refine_diagram(&request.current_code, &request.feedback)
        .await?;
    info!(diagram_type = %result.diagram_type, "Diagram refined");
    Ok(Json(result.into()))
}

/// POST /api/transcribe - base64 audio to text.
pub async fn transcribe(
    State(state): State<AppState>,
    Json(request): Json<TranscribeRequest>,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let voice = require_voice(&state)?;
    let text = voice.transcribe_base64(&request.audio_base64).await?;
    info!(chars = text.len(), "Audio transcribed");
    Ok(Json(TranscriptionResponse { text }))
}

/// POST /api/synthesize - text to base64 audio.
pub async fn synthesize(
    State(state): State<AppState>,
    Json(request): Json<SynthesizeRequest>,
) -> Result<Json<AudioResponse>, ApiError> {
    let voice = require_voice(&state)?;
    let audio_base64 = voice.synthesize_base64(&request.text).await?;
    info!(chars = request.text.len(), "Speech synthesized");
    Ok(Json(AudioResponse { audio_base64 }))
}

/// GET /api/sessions - summaries of active sessions.
///
/// Sessions with a turn in flight are omitted, so the count here can be
/// lower than `active_sessions` in /api/health.
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionsResponse> {
    Json(SessionsResponse {
        sessions: state.sessions.list(),
    })
}

/// GET /api/sessions/{id} - ordered message history.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionHistoryResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let messages = state.sessions.history(session_id).await?;
    Ok(Json(SessionHistoryResponse {
        session_id,
        messages,
    }))
}

/// DELETE /api/sessions/{id} - end a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&id)?;
    state.sessions.remove(session_id)?;
    info!(session_id = %session_id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

// -- Helpers --

fn require_voice(state: &AppState) -> Result<&VoiceService, ApiError> {
    state.voice.as_deref().ok_or_else(|| {
        ApiError::ServiceUnavailable(
            "Voice is not configured: set OPENAI_API_KEY and LMNT_API_KEY".to_string(),
        )
    })
}

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid session id '{}'", raw)))
}
