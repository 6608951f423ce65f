use std::sync::Arc;

use crate::config::Config;
use crate::matching_client::MatchingApi;
use crate::platform::backend::PlatformBackend;
use crate::platform::facade::PlatformTimings;
use crate::session::{Session, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Matching API client handed to every new session. Swapped for a fake in tests.
    pub matching_api: Arc<dyn MatchingApi>,
    pub backend: Arc<dyn PlatformBackend>,
    pub timings: PlatformTimings,
    pub config: Config,
}

impl AppState {
    pub fn open_session(&self) -> Arc<Session> {
        self.sessions.insert(Session::open(
            Arc::clone(&self.matching_api),
            Arc::clone(&self.backend),
            self.config.notification_ttl,
            self.timings.clone(),
        ))
    }
}
