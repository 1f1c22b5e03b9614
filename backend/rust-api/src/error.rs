use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::SessionStatus;

/// Every failure a caller can observe. Each variant stays distinguishable on
/// the wire so the client can pick the right recovery path (retry start,
/// show a join-code error, and so on) instead of a generic failure page.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session not found")]
    SessionNotFound,

    #[error("participant not found in this session")]
    ParticipantNotFound,

    #[error("session has already started")]
    SessionAlreadyActive,

    #[error("session is full")]
    SessionFull,

    #[error("only the host may perform this action")]
    Forbidden,

    #[error("action not allowed while session is {0}")]
    InvalidState(SessionStatus),

    #[error("question generation unavailable: {0}")]
    ContentUnavailable(String),

    #[error("unable to allocate a unique join code")]
    CodeSpaceExhausted,

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Stable machine-readable discriminator for clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::SessionNotFound => "session_not_found",
            ApiError::ParticipantNotFound => "participant_not_found",
            ApiError::SessionAlreadyActive => "session_already_active",
            ApiError::SessionFull => "session_full",
            ApiError::Forbidden => "forbidden",
            ApiError::InvalidState(_) => "invalid_state",
            ApiError::ContentUnavailable(_) => "content_unavailable",
            ApiError::CodeSpaceExhausted => "code_space_exhausted",
            ApiError::Validation(_) => "validation",
            ApiError::Internal(_) => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound | ApiError::ParticipantNotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::SessionAlreadyActive
            | ApiError::SessionFull
            | ApiError::InvalidState(_) => StatusCode::CONFLICT,
            ApiError::ContentUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::CodeSpaceExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal errors signal a bug in the lock discipline, not a normal
        // user-facing condition; log the full chain before masking it.
        if let ApiError::Internal(ref e) = self {
            tracing::error!("internal error: {:#}", e);
        }

        let status = self.status_code();
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}
