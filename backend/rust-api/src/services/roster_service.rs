use chrono::Utc;

use crate::error::ApiError;
use crate::metrics::PARTICIPANTS_JOINED_TOTAL;
use crate::models::{Participant, SessionStatus, SESSION_CAPACITY};
use crate::services::session_store::SessionStore;

/// Admission control on top of the store: lobby-only joins, idempotent
/// re-joins, and a capacity check atomic with the insert.
pub struct RosterService<'a> {
    store: &'a SessionStore,
}

impl<'a> RosterService<'a> {
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    /// Seats `user_id` in the session's lobby. A retried or re-polled join
    /// returns the existing seat unchanged rather than duplicating it or
    /// resetting the score. The host is seated at creation time, so a host
    /// re-join also lands on the idempotent path.
    pub async fn join(
        &self,
        code: &str,
        user_id: &str,
        display_name: &str,
    ) -> Result<Participant, ApiError> {
        let user_id = user_id.to_string();
        let display_name = display_name.to_string();

        let participant = self
            .store
            .with_session(code, move |session| {
                // No late joins mid-round, even for an already-seated user.
                if session.status != SessionStatus::Lobby {
                    return Err(ApiError::SessionAlreadyActive);
                }

                if let Some(existing) = session.participant(&user_id) {
                    return Ok(existing.clone());
                }

                // The size check and the push run under the same session
                // lock, so two joins cannot both observe a free seat.
                if session.participants.len() >= SESSION_CAPACITY {
                    return Err(ApiError::SessionFull);
                }

                let participant = Participant {
                    user_id: user_id.clone(),
                    display_name,
                    is_host: session.is_host(&user_id),
                    score: 0,
                    joined_at: Utc::now(),
                };
                session.participants.push(participant.clone());

                PARTICIPANTS_JOINED_TOTAL
                    .with_label_values(&["player"])
                    .inc();
                tracing::info!(code = %session.code, user = %user_id, "participant joined");
                Ok(participant)
            })
            .await?;

        Ok(participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use std::sync::Arc;

    async fn lobby(store: &SessionStore) -> String {
        store
            .create("host-1", "Asha", json!({}))
            .await
            .unwrap()
            .code
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let store = SessionStore::new(&Config::default());
        let code = lobby(&store).await;
        let roster = RosterService::new(&store);

        let first = roster.join(&code, "user-2", "Ben").await.unwrap();
        let second = roster.join(&code, "user-2", "Ben Again").await.unwrap();

        assert_eq!(first.joined_at, second.joined_at);
        assert_eq!(second.display_name, "Ben");
        assert_eq!(second.score, 0);

        let session = store.get(&code).await.unwrap();
        assert_eq!(session.participants.len(), 2);
    }

    #[tokio::test]
    async fn join_unknown_code_is_not_found() {
        let store = SessionStore::new(&Config::default());
        let roster = RosterService::new(&store);
        let err = roster.join("ZZZZZ", "user-2", "Ben").await.unwrap_err();
        assert!(matches!(err, ApiError::SessionNotFound));
    }

    #[tokio::test]
    async fn capacity_is_never_exceeded_under_concurrency() {
        let store = Arc::new(SessionStore::new(&Config::default()));
        let code = lobby(&store).await;

        // Host holds one seat; race 30 joiners for the remaining 14.
        let mut handles = Vec::new();
        for i in 0..30 {
            let store = store.clone();
            let code = code.clone();
            handles.push(tokio::spawn(async move {
                RosterService::new(&store)
                    .join(&code, &format!("user-{i}"), "Player")
                    .await
            }));
        }

        let mut admitted = 0;
        let mut full = 0;
        for result in futures::future::join_all(handles).await {
            match result.unwrap() {
                Ok(_) => admitted += 1,
                Err(ApiError::SessionFull) => full += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(admitted, SESSION_CAPACITY - 1);
        assert_eq!(full, 30 - (SESSION_CAPACITY - 1));

        let session = store.get(&code).await.unwrap();
        assert_eq!(session.participants.len(), SESSION_CAPACITY);
    }

    #[tokio::test]
    async fn join_at_capacity_fails_without_dropping_anyone() {
        let store = SessionStore::new(&Config::default());
        let code = lobby(&store).await;
        let roster = RosterService::new(&store);

        for i in 0..(SESSION_CAPACITY - 1) {
            roster
                .join(&code, &format!("user-{i}"), "Player")
                .await
                .unwrap();
        }

        let err = roster.join(&code, "late-user", "Late").await.unwrap_err();
        assert!(matches!(err, ApiError::SessionFull));

        let session = store.get(&code).await.unwrap();
        assert_eq!(session.participants.len(), SESSION_CAPACITY);
        assert!(session.participant("late-user").is_none());
    }
}
