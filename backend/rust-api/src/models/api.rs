use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Participant, Question, SessionStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 64))]
    pub display_name: String,
    /// Content scope forwarded verbatim to the question generator.
    pub context: serde_json::Value,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JoinSessionRequest {
    #[validate(length(min = 1, max = 64))]
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub code: String,
    pub status: SessionStatus,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct JoinSessionResponse {
    pub participant: Participant,
    pub is_host: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Late-bound scope overrides (chosen chapter, language) merged over the
    /// session context before the generator call.
    #[serde(default)]
    pub context_overrides: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub status: SessionStatus,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub code: String,
    pub status: SessionStatus,
    pub participants: Vec<Participant>,
    pub is_host: bool,
    /// Present only once the round has started; hidden in the lobby so a
    /// polling client cannot read ahead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
}

#[derive(Debug, Deserialize)]
pub struct ReportScoreRequest {
    /// Client-computed running total, not a delta. Negative totals are
    /// unrepresentable by construction.
    pub score: u32,
}

#[derive(Debug, Serialize)]
pub struct ReportScoreResponse {
    /// The stored value after the monotone-max merge; may exceed the
    /// reported score if a later report already landed.
    pub current_score: u32,
}

#[derive(Debug, Serialize)]
pub struct CompleteSessionResponse {
    pub status: SessionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub score: u32,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub status: SessionStatus,
    pub entries: Vec<LeaderboardEntry>,
}
