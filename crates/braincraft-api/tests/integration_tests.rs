//! Integration tests for the BrainCraft API.
//!
//! Each test builds its own router over a scripted model client and drives
//! it with `oneshot`, so no network access is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use braincraft_api::create_router;
use braincraft_api::handlers::{
    ChatResponse, DiagramResponse, HealthResponse, SessionHistoryResponse, SessionsResponse,
};
use braincraft_api::state::AppState;
use braincraft_chat::error_classifier::{API_KEY_MESSAGE, RATE_LIMIT_MESSAGE};
use braincraft_chat::{DiagramAgent, MockModelClient, ModelError, Role};
use braincraft_core::config::BraincraftConfig;
use braincraft_voice::VoiceService;

// =============================================================================
// Helpers
// =============================================================================

const FLOWCHART_REPLY: &str =
    "Here is your login flow.\n```mermaid\ngraph TD\n    A[Login] --> B{Valid?}\n```\nEnjoy!";

fn make_state(model: Arc<MockModelClient>, voice: Option<VoiceService>) -> AppState {
    AppState::new(BraincraftConfig::default(), DiagramAgent::new(model), voice)
}

fn make_app(model: MockModelClient) -> axum::Router {
    create_router(make_state(Arc::new(model), None))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_root_welcome() {
    let resp = make_app(MockModelClient::new()).oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["message"], "Welcome to BrainCraft API");
    assert_eq!(json["docs_url"], "/docs");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_docs_lists_endpoints() {
    let resp = make_app(MockModelClient::new())
        .oneshot(get("/docs"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let paths: Vec<&str> = json["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["path"].as_str())
        .collect();
    assert!(paths.contains(&"/api/chat"));
    assert!(paths.contains(&"/api/generate"));
}

#[tokio::test]
async fn test_health() {
    let resp = make_app(MockModelClient::new())
        .oneshot(get("/api/health"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "BrainCraft API");
    assert_eq!(health.active_sessions, 0);
    assert!(!health.voice_enabled);
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_returns_diagram() {
    let app = make_app(MockModelClient::new().with_reply(FLOWCHART_REPLY));
    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"message":"Create a flowchart for user login"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let chat: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(chat.status, "success");
    assert_eq!(chat.response, "Here is your login flow.\n\nEnjoy!");
    let diagram = chat.diagram.unwrap();
    assert_eq!(diagram.code, "graph TD\n    A[Login] --> B{Valid?}");
    assert_eq!(diagram.diagram_type, "flowchart");
}

#[tokio::test]
async fn test_chat_plain_reply_omits_diagram() {
    let app = make_app(MockModelClient::new().with_reply("Hi! What should we draw?"));
    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message":"hello"}"#))
        .await
        .unwrap();

    let json = body_json(resp).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["response"], "Hi! What should we draw?");
    assert!(json.get("diagram").is_none());
}

#[tokio::test]
async fn test_chat_model_error_is_classified_with_200() {
    let model = MockModelClient::new().with_error(ModelError::Authentication { status: 401 });
    let resp = make_app(model)
        .oneshot(post_json("/api/chat", r#"{"message":"draw a diagram"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let chat: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(chat.status, "error");
    assert_eq!(chat.response, format!("Error: {}", API_KEY_MESSAGE));
    assert!(chat.diagram.is_none());
}

#[tokio::test]
async fn test_chat_empty_message_is_error_turn() {
    let model = Arc::new(MockModelClient::new());
    let state = make_state(model.clone(), None);
    let app = create_router(state.clone());
    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message":"   "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["response"], "Error: message cannot be empty");
    assert!(json.get("session_id").is_none());
    assert_eq!(model.call_count(), 0);
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_chat_rejected_message_does_not_create_session() {
    let state = make_state(Arc::new(MockModelClient::new()), None);
    let app = create_router(state.clone());
    let too_long = format!(r#"{{"message":"{}"}}"#, "x".repeat(5000));
    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", &too_long))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["status"], "error");
    assert_eq!(state.sessions.len(), 0);

    // An existing session is echoed back and left unchanged.
    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", r#"{"message":"hi"}"#))
        .await
        .unwrap();
    let chat: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    let id = chat.session_id.unwrap();

    let body = format!(r#"{{"message":"","session_id":"{}"}}"#, id);
    let resp = app.oneshot(post_json("/api/chat", &body)).await.unwrap();
    let rejected: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(rejected.status, "error");
    assert_eq!(rejected.session_id, Some(id));
    assert_eq!(state.sessions.len(), 1);
    assert_eq!(state.sessions.history(id).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_chat_requests_on_one_session() {
    const REQUESTS: usize = 10;
    let state = make_state(
        Arc::new(MockModelClient::new().with_fallback("Okay.")),
        None,
    );
    let app = create_router(state.clone());
    let (id, _) = state.sessions.get_or_create(None).await;

    let mut handles = Vec::with_capacity(REQUESTS);
    for i in 0..REQUESTS {
        let app = app.clone();
        let body = format!(r#"{{"message":"hello {}","session_id":"{}"}}"#, i, id);
        handles.push(tokio::spawn(async move {
            app.oneshot(post_json("/api/chat", &body)).await.unwrap()
        }));
    }
    for handle in handles {
        let resp = handle.await.unwrap();
        let chat: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(chat.status, "success");
        assert_eq!(chat.session_id, Some(id));
    }

    let resp = app
        .oneshot(get(&format!("/api/sessions/{}", id)))
        .await
        .unwrap();
    let history: SessionHistoryResponse =
        serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(history.messages.len(), 2 * REQUESTS);
    for pair in history.messages.chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[1].role(), Role::Assistant);
    }
}

#[tokio::test]
async fn test_chat_invalid_session_id() {
    let resp = make_app(MockModelClient::new())
        .oneshot(post_json(
            "/api/chat",
            r#"{"message":"hi","session_id":"not-a-uuid"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_chat_session_carries_history() {
    let model = Arc::new(
        MockModelClient::new()
            .with_reply(FLOWCHART_REPLY)
            .with_reply("```mermaid\ngraph TD\n    A[Login] --> B{Valid?}\n    B --> C[Logout]\n```"),
    );
    let state = make_state(model.clone(), None);
    let app = create_router(state.clone());

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/chat",
            r#"{"message":"Create a flowchart for user login"}"#,
        ))
        .await
        .unwrap();
    let first: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    let first_id = first.session_id.unwrap();

    let body = format!(
        r#"{{"message":"Add a logout step","session_id":"{}"}}"#,
        first_id
    );
    let resp = app.clone().oneshot(post_json("/api/chat", &body)).await.unwrap();
    let second: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(second.session_id, Some(first_id));
    assert_eq!(second.status, "success");

    // The second model call saw the first turn.
    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1]
        .iter()
        .any(|m| m.content() == "Create a flowchart for user login"));

    let resp = app
        .oneshot(get(&format!("/api/sessions/{}", first_id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let history: SessionHistoryResponse =
        serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(history.messages.len(), 4);
    assert_eq!(history.messages[2].content(), "Add a logout step");
}

// =============================================================================
// Generate / refine
// =============================================================================

#[tokio::test]
async fn test_generate_accepts_message_field() {
    let app = make_app(MockModelClient::new().with_reply(
        "```mermaid\nsequenceDiagram\n    Alice->>Bob: Hi\n```",
    ));
    let resp = app
        .oneshot(post_json(
            "/api/generate",
            r#"{"message":"alice greets bob"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let diagram: DiagramResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(diagram.diagram_type, "sequence");
    assert_eq!(diagram.diagram_code, "sequenceDiagram\n    Alice->>Bob: Hi");
    assert_eq!(diagram.explanation, "");
}

#[tokio::test]
async fn test_generate_missing_description() {
    let resp = make_app(MockModelClient::new())
        .oneshot(post_json("/api/generate", r#"{}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_without_diagram_is_422() {
    let app = make_app(MockModelClient::new().with_reply("I can't draw that."));
    let resp = app
        .oneshot(post_json(
            "/api/generate",
            r#"{"description":"something vague"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "unprocessable_entity");
}

#[tokio::test]
async fn test_generate_rate_limited_is_502() {
    let model = MockModelClient::new().with_error(ModelError::RateLimited("429".to_string()));
    let resp = make_app(model)
        .oneshot(post_json("/api/generate", r#"{"description":"a pie chart"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(resp).await;
    assert_eq!(json["message"], RATE_LIMIT_MESSAGE);
}

#[tokio::test]
async fn test_refine() {
    let model = Arc::new(
        MockModelClient::new().with_reply("```mermaid\ngraph LR\n    A --> B\n```\nNow left to right."),
    );
    let app = create_router(make_state(model.clone(), None));
    let resp = app
        .oneshot(post_json(
            "/api/refine",
            r#"{"current_code":"graph TD\n    A --> B","feedback":"make it horizontal"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let diagram: DiagramResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(diagram.diagram_code, "graph LR\n    A --> B");
    assert_eq!(diagram.explanation, "Now left to right.");

    let calls = model.calls();
    let user_turn = calls[0].last().unwrap().content();
    assert!(user_turn.contains("graph TD"));
    assert!(user_turn.contains("make it horizontal"));
}

#[tokio::test]
async fn test_refine_empty_code() {
    let resp = make_app(MockModelClient::new())
        .oneshot(post_json(
            "/api/refine",
            r#"{"current_code":"  ","feedback":"more"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Voice
// =============================================================================

#[tokio::test]
async fn test_voice_not_configured_is_503() {
    let app = make_app(MockModelClient::new());
    let resp = app
        .clone()
        .oneshot(post_json("/api/transcribe", r#"{"audio_base64":"UklGRg=="}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let resp = app
        .oneshot(post_json("/api/synthesize", r#"{"text":"hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_transcribe_and_synthesize_with_mocks() {
    let state = make_state(
        Arc::new(MockModelClient::new()),
        Some(VoiceService::mock("draw a gantt chart")),
    );
    let app = create_router(state);

    let resp = app
        .clone()
        .oneshot(post_json("/api/transcribe", r#"{"audio_base64":"UklGRg=="}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["text"], "draw a gantt chart");

    let resp = app
        .clone()
        .oneshot(post_json("/api/synthesize", r#"{"text":"hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["audio_base64"], "aGVsbG8=");

    let resp = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(body_json(resp).await["voice_enabled"], true);
}

#[tokio::test]
async fn test_transcribe_invalid_base64() {
    let state = make_state(Arc::new(MockModelClient::new()), Some(VoiceService::mock("x")));
    let resp = create_router(state)
        .oneshot(post_json("/api/transcribe", r#"{"audio_base64":"%%%"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = make_app(MockModelClient::new());
    let id = uuid::Uuid::new_v4();

    let resp = app
        .clone()
        .oneshot(get(&format!("/api/sessions/{}", id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .oneshot(delete(&format!("/api/sessions/{}", id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_and_delete_sessions() {
    let app = make_app(MockModelClient::new().with_reply("Hello!"));
    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", r#"{"message":"hi"}"#))
        .await
        .unwrap();
    let chat: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();

    let resp = app.clone().oneshot(get("/api/sessions")).await.unwrap();
    let listed: SessionsResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(listed.sessions.len(), 1);
    let session_id = chat.session_id.unwrap();
    assert_eq!(listed.sessions[0].id, session_id);
    assert_eq!(listed.sessions[0].message_count, 2);

    let resp = app
        .clone()
        .oneshot(delete(&format!("/api/sessions/{}", session_id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.oneshot(get("/api/sessions")).await.unwrap();
    let listed: SessionsResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(listed.sessions.is_empty());
}

#[tokio::test]
async fn test_malformed_session_id_is_400() {
    let resp = make_app(MockModelClient::new())
        .oneshot(get("/api/sessions/abc"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
