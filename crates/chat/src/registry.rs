//! In-process registry of isolated chat sessions.
//!
//! Each session sits behind its own `tokio::sync::Mutex`, so two sends on the
//! same session run one after the other while different sessions proceed
//! independently. The map lock is only held for lookups and inserts, never
//! across a model call.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use palaver_core::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::session::{Session, SessionSettings};

/// Maximum number of live sessions before the oldest is evicted.
pub const MAX_SESSIONS: usize = 1_000;

pub type SharedSession = Arc<Mutex<Session>>;

struct Entry {
    created_at: DateTime<Utc>,
    session: SharedSession,
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Entry>>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Create a session and return its id with a handle to it.
    pub async fn create(&self, settings: SessionSettings) -> Result<(String, SharedSession)> {
        let session = Session::new(settings)?;
        let id = session.id().to_string();
        let created_at = session.created_at();
        let shared = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;

        // Evict oldest session if at capacity
        if sessions.len() >= self.capacity {
            if let Some(oldest_key) = sessions
                .iter()
                .min_by_key(|(_, e)| e.created_at)
                .map(|(k, _)| k.clone())
            {
                sessions.remove(&oldest_key);
                info!(session = %oldest_key, "Evicted oldest session");
            }
        }

        sessions.insert(
            id.clone(),
            Entry {
                created_at,
                session: shared.clone(),
            },
        );
        info!(session = %id, total = sessions.len(), "Session created");

        Ok((id, shared))
    }

    pub async fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|e| e.session.clone())
    }

    /// Remove a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(session = %id, "Session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
