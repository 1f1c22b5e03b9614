use std::sync::Arc;

use crate::config::Config;
use crate::services::content_service::ContentGenerator;
use crate::services::session_store::SessionStore;

pub struct AppState {
    pub config: Config,
    pub store: Arc<SessionStore>,
    pub generator: Arc<dyn ContentGenerator>,
}

impl AppState {
    pub fn new(config: Config, generator: Arc<dyn ContentGenerator>) -> Self {
        let store = Arc::new(SessionStore::new(&config));
        Self {
            config,
            store,
            generator,
        }
    }
}

pub mod code_generator;
pub mod content_service;
pub mod leaderboard_service;
pub mod lifecycle_service;
pub mod roster_service;
pub mod score_service;
pub mod session_store;
