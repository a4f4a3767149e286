//! API error types and JSON error response formatting.
//!
//! ApiError gives every endpoint the same JSON error shape and maps agent
//! and voice failures to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use braincraft_chat::ChatError;
use braincraft_voice::VoiceError;
use serde::Serialize;
use tracing::warn;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid input.
    BadRequest(String),
    /// 404 Not Found - unknown session.
    NotFound(String),
    /// 422 Unprocessable Entity - the model replied without a diagram.
    UnprocessableEntity(String),
    /// 500 Internal Server Error.
    Internal(String),
    /// 502 Bad Gateway - an upstream model or voice provider failed.
    BadGateway(String),
    /// 503 Service Unavailable - component not configured.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match &err {
            ChatError::EmptyMessage | ChatError::MessageTooLong(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ChatError::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            ChatError::NoDiagram => ApiError::UnprocessableEntity(err.to_string()),
            ChatError::Model(_) => {
                warn!("Model call failed: {}", err);
                ApiError::BadGateway(err.user_message())
            }
            ChatError::Configuration(_) => ApiError::Internal(err.user_message()),
        }
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        match &err {
            VoiceError::InvalidInput(_) => ApiError::BadRequest(err.to_string()),
            VoiceError::NotConfigured(_) => ApiError::ServiceUnavailable(err.to_string()),
            VoiceError::Transport(_) | VoiceError::Status { .. } | VoiceError::Malformed(_) => {
                warn!("Voice provider failed: {}", err);
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braincraft_chat::error_classifier::{API_KEY_MESSAGE, RATE_LIMIT_MESSAGE};
    use braincraft_chat::ModelError;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_chat_error_status_mapping() {
        assert_eq!(status_of(ChatError::EmptyMessage.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ChatError::MessageTooLong(10).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ChatError::SessionNotFound(uuid::Uuid::nil()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ChatError::NoDiagram.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ChatError::Model(ModelError::Timeout(60)).into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_model_errors_are_classified() {
        let err: ApiError = ChatError::Model(ModelError::Authentication { status: 401 }).into();
        assert!(matches!(err, ApiError::BadGateway(ref m) if m == API_KEY_MESSAGE));

        let err: ApiError = ChatError::Model(ModelError::RateLimited("slow down".into())).into();
        assert!(matches!(err, ApiError::BadGateway(ref m) if m == RATE_LIMIT_MESSAGE));
    }

    #[test]
    fn test_voice_error_status_mapping() {
        assert_eq!(
            status_of(VoiceError::InvalidInput("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(VoiceError::NotConfigured("x".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(
                VoiceError::Status {
                    status: 500,
                    body: String::new()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
    }
}
