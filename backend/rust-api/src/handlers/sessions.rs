use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{AppJson, Identity},
    models::*,
    services::{
        leaderboard_service::LeaderboardService, lifecycle_service::LifecycleService,
        roster_service::RosterService, score_service::ScoreService, AppState,
    },
};

/// Creates a lobby session with the caller seated as host.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    AppJson(req): AppJson<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let session = state
        .store
        .create(&identity.user_id, &req.display_name, req.context)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            code: session.code,
            status: session.status,
            expires_at: session.expires_at,
        }),
    ))
}

pub async fn join_session(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(req): AppJson<JoinSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let participant = RosterService::new(&state.store)
        .join(&code, &identity.user_id, &req.display_name)
        .await?;

    let is_host = participant.is_host;
    Ok((
        StatusCode::OK,
        Json(JoinSessionResponse {
            participant,
            is_host,
        }),
    ))
}

/// The polling endpoint: a fresh, read-only view of the session. Questions
/// stay hidden until the round has started.
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.store.get(&code).await?;

    let questions = match session.status {
        SessionStatus::Active | SessionStatus::Completed => Some(session.questions),
        _ => None,
    };

    Ok(Json(SessionStatusResponse {
        code: session.code,
        status: session.status,
        participants: session.participants,
        is_host: session.host_id == identity.user_id,
        questions,
    }))
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(req): AppJson<StartSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = LifecycleService::new(&state.store, state.generator.clone())
        .start(&code, &identity.user_id, req.context_overrides.as_ref())
        .await?;

    Ok(Json(StartSessionResponse {
        status: session.status,
        questions: session.questions,
    }))
}

pub async fn report_score(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(req): AppJson<ReportScoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let current_score = ScoreService::new(&state.store)
        .report_score(&code, &identity.user_id, req.score)
        .await?;

    Ok(Json(ReportScoreResponse { current_score }))
}

pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = LifecycleService::new(&state.store, state.generator.clone())
        .complete(&code, &identity.user_id)
        .await?;

    Ok(Json(CompleteSessionResponse {
        status: session.status,
    }))
}

pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let board = LeaderboardService::new(&state.store)
        .leaderboard(&code)
        .await?;

    Ok(Json(board))
}
