//! Visitor sessions. Each session owns one document and the two façades that
//! mutate it; the store keeps a bounded number of them, evicting the oldest.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::ai::interactions::InteractionFacade;
use crate::matching_client::MatchingApi;
use crate::platform::backend::PlatformBackend;
use crate::platform::facade::{PlatformFacade, PlatformTimings};
use crate::ui::dom::{Document, NodeId, SharedDocument};
use crate::ui::views;

pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub interactions: InteractionFacade,
    pub platform: PlatformFacade,
    document: SharedDocument,
}

impl Session {
    /// Mounts the landing page, seeds the jobs grid and starts the stat
    /// counters.
    pub fn open(
        api: Arc<dyn MatchingApi>,
        backend: Arc<dyn PlatformBackend>,
        transient_ttl: Duration,
        timings: PlatformTimings,
    ) -> Self {
        let document = SharedDocument::new(Document::new());
        document.with(|doc| {
            for section in views::landing_page(&[]) {
                doc.append(section);
            }
        });

        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            interactions: InteractionFacade::new(document.clone(), api, transient_ttl),
            platform: PlatformFacade::new(document.clone(), backend, transient_ttl, timings),
            document,
        };

        let jobs = session.platform.load_sample_jobs();
        let counters = session.platform.start_counters();
        debug!(session_id = %session.id, jobs, counters, "Session opened");
        session
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// Removes a transient element, whichever façade created it.
    pub fn dismiss(&self, id: NodeId) -> bool {
        // Non-short-circuit: each façade drops its own expiry timer.
        self.interactions.dismiss(id) | self.platform.dismiss(id)
    }

    pub fn to_html(&self) -> String {
        self.document.lock().to_html()
    }
}

#[derive(Default)]
struct StoreInner {
    sessions: HashMap<Uuid, Arc<Session>>,
    order: VecDeque<Uuid>,
}

/// Bounded in-memory session registry.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<StoreInner>>,
    capacity: usize,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let mut inner = self.lock();

        while inner.sessions.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            if inner.sessions.remove(&oldest).is_some() {
                info!(session_id = %oldest, "Session evicted");
            }
        }

        inner.order.push_back(session.id);
        inner.sessions.insert(session.id, Arc::clone(&session));
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        self.lock().sessions.get(id).cloned()
    }

    /// Number of open sessions.
    pub fn count(&self) -> usize {
        self.lock().sessions.len()
    }
}
