use crate::error::ApiError;
use crate::metrics::SCORE_REPORTS_TOTAL;
use crate::models::SessionStatus;
use crate::services::session_store::SessionStore;

/// Merges client-reported running totals. Clients recompute their cumulative
/// score locally and send the total, not a delta, so reordered or duplicated
/// reports merge as a monotone max and the visible score can never regress.
pub struct ScoreService<'a> {
    store: &'a SessionStore,
}

impl<'a> ScoreService<'a> {
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    /// Stores `max(current, reported)` and returns the stored value, so a
    /// client can detect that a later report of its own already superseded
    /// this one.
    pub async fn report_score(
        &self,
        code: &str,
        user_id: &str,
        reported: u32,
    ) -> Result<u32, ApiError> {
        let user_id = user_id.to_string();

        self.store
            .with_session(code, move |session| {
                if session.status != SessionStatus::Active {
                    return Err(ApiError::InvalidState(session.status));
                }

                let participant = session
                    .participant_mut(&user_id)
                    .ok_or(ApiError::ParticipantNotFound)?;

                let result = if reported > participant.score {
                    participant.score = reported;
                    "applied"
                } else {
                    "superseded"
                };
                SCORE_REPORTS_TOTAL.with_label_values(&[result]).inc();

                Ok(participant.score)
            })
            .await
    }
}
