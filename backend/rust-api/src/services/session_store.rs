use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::error::ApiError;
use crate::metrics::{PARTICIPANTS_JOINED_TOTAL, SESSIONS_LIVE, SESSIONS_TOTAL};
use crate::models::{Participant, Session, SessionStatus};
use crate::services::code_generator::{new_code, MAX_CODE_ATTEMPTS};

/// Single owner of all session state. Every mutation runs under the lock of
/// the session it touches (one tokio Mutex per code), so unrelated sessions
/// never contend and within one session the join/start/score invariants hold.
///
/// The outer RwLock only guards the code -> session map itself; it is never
/// held across an await on a session lock holder's behalf, which keeps the
/// map -> session lock order acyclic.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    lobby_ttl: Duration,
    retention: Duration,
    code_length: usize,
}

impl SessionStore {
    pub fn new(config: &Config) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            lobby_ttl: Duration::minutes(config.lobby_ttl_minutes),
            retention: Duration::minutes(config.retention_minutes),
            code_length: config.join_code_length,
        }
    }

    /// Creates a session in the lobby with the creator already seated as
    /// host. The collision check and the insert happen under one write lock
    /// acquisition, so two concurrent creates can never share a code.
    pub async fn create(
        &self,
        host_id: &str,
        display_name: &str,
        context: serde_json::Value,
    ) -> Result<Session, ApiError> {
        let now = Utc::now();

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = new_code(self.code_length);
            let mut map = self.sessions.write().await;

            if let Some(existing) = map.get(&code) {
                let mut session = existing.lock().await;
                self.touch_expiry(&mut session, now);
                if session.status != SessionStatus::Expired {
                    // Live session owns this code; try another draw.
                    continue;
                }
            }

            let session = Session {
                code: code.clone(),
                host_id: host_id.to_string(),
                status: SessionStatus::Lobby,
                context: context.clone(),
                questions: Vec::new(),
                participants: vec![Participant {
                    user_id: host_id.to_string(),
                    display_name: display_name.to_string(),
                    is_host: true,
                    score: 0,
                    joined_at: now,
                }],
                created_at: now,
                expires_at: now + self.lobby_ttl,
            };

            map.insert(code, Arc::new(Mutex::new(session.clone())));
            drop(map);

            SESSIONS_TOTAL.with_label_values(&["created"]).inc();
            SESSIONS_LIVE.inc();
            PARTICIPANTS_JOINED_TOTAL.with_label_values(&["host"]).inc();

            tracing::info!(code = %session.code, host = %host_id, "session created");
            return Ok(session);
        }

        tracing::warn!("join code space exhausted after {} draws", MAX_CODE_ATTEMPTS);
        Err(ApiError::CodeSpaceExhausted)
    }

    /// Returns a point-in-time snapshot of the session. Expired and unknown
    /// codes are indistinguishable to callers: stale games are not joinable.
    pub async fn get(&self, code: &str) -> Result<Session, ApiError> {
        let entry = self.entry(code).await?;
        let mut session = entry.lock().await;
        self.touch_expiry(&mut session, Utc::now());
        if session.status == SessionStatus::Expired {
            return Err(ApiError::SessionNotFound);
        }
        Ok(session.clone())
    }

    /// Runs `f` with the session lock held. The closure is synchronous on
    /// purpose: nothing may block on external I/O while holding a session
    /// lock (the start protocol releases it around the generator call).
    pub async fn with_session<T, F>(&self, code: &str, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Session) -> Result<T, ApiError>,
    {
        let entry = self.entry(code).await?;
        let mut session = entry.lock().await;
        self.touch_expiry(&mut session, Utc::now());
        if session.status == SessionStatus::Expired {
            return Err(ApiError::SessionNotFound);
        }
        f(&mut session)
    }

    async fn entry(&self, code: &str) -> Result<Arc<Mutex<Session>>, ApiError> {
        let map = self.sessions.read().await;
        map.get(code).cloned().ok_or(ApiError::SessionNotFound)
    }

    /// Lazy idle-expiry check, applied on every lookup so a stale lobby is
    /// never observable even between sweep ticks. Only Lobby ages out;
    /// a round in progress is not abandoned because the lobby is old.
    fn touch_expiry(&self, session: &mut Session, now: chrono::DateTime<Utc>) {
        if session.status == SessionStatus::Lobby && now >= session.expires_at {
            session.status = SessionStatus::Expired;
            SESSIONS_TOTAL.with_label_values(&["expired"]).inc();
            SESSIONS_LIVE.dec();
            tracing::info!(code = %session.code, "lobby session expired");
        }
    }

    /// One sweep pass: age out idle lobbies and evict terminal sessions
    /// whose retention window has elapsed. Returns the number evicted.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let entries: Vec<(String, Arc<Mutex<Session>>)> = {
            let map = self.sessions.read().await;
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };

        let mut evict = Vec::new();
        for (code, entry) in entries {
            let retired = {
                let mut session = entry.lock().await;
                self.touch_expiry(&mut session, now);
                let terminal = matches!(
                    session.status,
                    SessionStatus::Completed | SessionStatus::Expired
                );
                terminal && now >= session.expires_at + self.retention
            };
            if retired {
                evict.push((code, entry));
            }
        }

        if evict.is_empty() {
            return 0;
        }

        self.remove_retired(evict).await
    }

    /// Removal phase of the sweep. Between the eviction decision and this
    /// write lock, a create may have reused an expired code for a fresh
    /// session, so each entry is removed only if the map still holds the
    /// exact session that was judged evictable.
    async fn remove_retired(&self, evict: Vec<(String, Arc<Mutex<Session>>)>) -> usize {
        let mut map = self.sessions.write().await;
        let mut removed = 0;
        for (code, entry) in &evict {
            if map
                .get(code)
                .is_some_and(|current| Arc::ptr_eq(current, entry))
            {
                map.remove(code);
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(count = removed, "evicted retired sessions");
        }
        removed
    }

    /// Number of sessions currently held, terminal records included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Background sweep so idle lobbies age out even when nobody polls them.
pub fn spawn_expiry_sweep(store: Arc<SessionStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            store.sweep().await;
        }
    })
}
