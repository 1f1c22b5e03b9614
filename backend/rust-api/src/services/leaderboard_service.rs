use crate::error::ApiError;
use crate::models::{LeaderboardEntry, LeaderboardResponse};
use crate::services::session_store::SessionStore;

/// Ranked view over the roster: score descending, ties broken by earlier
/// join, then by user id so the order is total and reproducible. Callable
/// while a round is live for in-play standings; authoritative only once the
/// session is completed.
pub struct LeaderboardService<'a> {
    store: &'a SessionStore,
}

impl<'a> LeaderboardService<'a> {
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    pub async fn leaderboard(&self, code: &str) -> Result<LeaderboardResponse, ApiError> {
        let session = self.store.get(code).await?;

        let mut ranked = session.participants;
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.joined_at.cmp(&b.joined_at))
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        Ok(LeaderboardResponse {
            status: session.status,
            entries: ranked
                .into_iter()
                .map(|p| LeaderboardEntry {
                    display_name: p.display_name,
                    score: p.score,
                })
                .collect(),
        })
    }
}
