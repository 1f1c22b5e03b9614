use std::sync::Arc;

use chrono::Utc;

use crate::error::ApiError;
use crate::metrics::{SESSIONS_LIVE, SESSIONS_TOTAL};
use crate::models::{Session, SessionStatus};
use crate::services::content_service::{merge_context, ContentGenerator};
use crate::services::session_store::SessionStore;

/// Drives the one-directional Lobby -> Active -> Completed lifecycle.
/// Expiry is the store's business; nothing here revisits a state.
pub struct LifecycleService<'a> {
    store: &'a SessionStore,
    generator: Arc<dyn ContentGenerator>,
}

impl<'a> LifecycleService<'a> {
    pub fn new(store: &'a SessionStore, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { store, generator }
    }

    /// Host-only, exactly-once transition into play. Three phases:
    ///
    /// 1. precheck under the session lock (host, still in lobby) and take
    ///    the merged generation context;
    /// 2. call the question generator with the lock released, so a slow
    ///    generation call never stalls concurrent polls or joins;
    /// 3. commit under the lock, re-checking Lobby so the loser of two
    ///    racing starts observes InvalidState instead of clobbering the
    ///    winner's frozen question set.
    ///
    /// On generator failure the session stays in the lobby and the caller
    /// sees ContentUnavailable, leaving the host free to retry.
    pub async fn start(
        &self,
        code: &str,
        requester_id: &str,
        context_overrides: Option<&serde_json::Value>,
    ) -> Result<Session, ApiError> {
        let requester = requester_id.to_string();
        let overrides = context_overrides.cloned();

        let generation_context = self
            .store
            .with_session(code, move |session| {
                if !session.is_host(&requester) {
                    return Err(ApiError::Forbidden);
                }
                if session.status != SessionStatus::Lobby {
                    return Err(ApiError::InvalidState(session.status));
                }
                Ok(merge_context(&session.context, overrides.as_ref()))
            })
            .await?;

        let questions = self
            .generator
            .generate(&generation_context)
            .await
            .map_err(|e| {
                tracing::warn!(code, "question generation failed: {:#}", e);
                ApiError::ContentUnavailable(e.to_string())
            })?;

        if questions.is_empty() {
            // An active session must hold a non-empty question set.
            return Err(ApiError::ContentUnavailable(
                "generator returned no questions".to_string(),
            ));
        }

        let requester = requester_id.to_string();
        let session = self
            .store
            .with_session(code, move |session| {
                if !session.is_host(&requester) {
                    return Err(ApiError::Forbidden);
                }
                if session.status != SessionStatus::Lobby {
                    // A concurrent start already won; its frozen set stands.
                    return Err(ApiError::InvalidState(session.status));
                }
                session.questions = questions;
                session.status = SessionStatus::Active;
                Ok(session.clone())
            })
            .await?;

        SESSIONS_TOTAL.with_label_values(&["started"]).inc();
        tracing::info!(
            code = %session.code,
            questions = session.questions.len(),
            participants = session.participants.len(),
            "session started"
        );
        Ok(session)
    }

    /// Host-only Active -> Completed. "Everyone finished" detection is the
    /// caller's business; the engine only exposes the explicit transition.
    pub async fn complete(&self, code: &str, requester_id: &str) -> Result<Session, ApiError> {
        let requester = requester_id.to_string();
        let session = self
            .store
            .with_session(code, move |session| {
                if !session.is_host(&requester) {
                    return Err(ApiError::Forbidden);
                }
                if session.status != SessionStatus::Active {
                    return Err(ApiError::InvalidState(session.status));
                }
                session.status = SessionStatus::Completed;
                // Retention for the final leaderboard counts from here.
                session.expires_at = Utc::now();
                Ok(session.clone())
            })
            .await?;

        SESSIONS_TOTAL.with_label_values(&["completed"]).inc();
        SESSIONS_LIVE.dec();
        tracing::info!(code = %session.code, "session completed");
        Ok(session)
    }
}
