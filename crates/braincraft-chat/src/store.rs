//! In-memory session store.
//!
//! Each session sits behind its own async mutex so concurrent requests on
//! the same session run one turn at a time, while different sessions never
//! contend beyond the brief map lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::ChatError;
use crate::session::ConversationSession;
use crate::types::{Message, SessionSummary};

pub type SharedSession = Arc<AsyncMutex<ConversationSession>>;

/// Process-local map of live conversation sessions.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SharedSession>>,
    idle_timeout_minutes: u32,
}

impl SessionStore {
    pub fn new(idle_timeout_minutes: u32) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout_minutes,
        }
    }

    /// Return the requested session, or a new one when the id is absent,
    /// unknown, or expired.
    pub async fn get_or_create(&self, requested: Option<Uuid>) -> (Uuid, SharedSession) {
        if let Some(id) = requested {
            if let Some(session) = self.get(id) {
                let expired = session.lock().await.is_expired(self.idle_timeout_minutes);
                if !expired {
                    return (id, session);
                }
                debug!(session_id = %id, "Session expired; starting a new one");
                self.remove_entry(id);
            }
        }

        let session = ConversationSession::new();
        let id = session.id();
        let shared = Arc::new(AsyncMutex::new(session));
        match self.sessions.lock() {
            Ok(mut map) => {
                map.insert(id, Arc::clone(&shared));
            }
            Err(e) => error!("Session lock poisoned: {}", e),
        }
        debug!(session_id = %id, "Created session");
        (id, shared)
    }

    pub fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions
            .lock()
            .ok()
            .and_then(|map| map.get(&id).cloned())
    }

    /// Ordered user/assistant messages of a session.
    pub async fn history(&self, id: Uuid) -> Result<Vec<Message>, ChatError> {
        let session = self.get(id).ok_or(ChatError::SessionNotFound(id))?;
        let guard = session.lock().await;
        Ok(guard.history().to_vec())
    }

    pub fn remove(&self, id: Uuid) -> Result<(), ChatError> {
        if self.remove_entry(id) {
            Ok(())
        } else {
            Err(ChatError::SessionNotFound(id))
        }
    }

    /// Summaries of all sessions not currently mid-turn.
    ///
    /// A session whose turn is in flight is locked and left out, so this can
    /// return fewer entries than [`SessionStore::len`].
    pub fn list(&self) -> Vec<SessionSummary> {
        let sessions: Vec<SharedSession> = match self.sessions.lock() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => return vec![],
        };
        sessions
            .iter()
            .filter_map(|s| s.try_lock().ok().map(|guard| guard.summary()))
            .collect()
    }

    /// Number of stored sessions, including those mid-turn.
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired sessions. Sessions locked by a running turn are kept.
    pub fn purge_expired(&self) -> usize {
        let Ok(mut map) = self.sessions.lock() else {
            return 0;
        };
        let before = map.len();
        let timeout = self.idle_timeout_minutes;
        map.retain(|_, s| match s.try_lock() {
            Ok(guard) => !guard.is_expired(timeout),
            Err(_) => true,
        });
        before - map.len()
    }

    fn remove_entry(&self, id: Uuid) -> bool {
        self.sessions
            .lock()
            .map(|mut map| map.remove(&id).is_some())
            .unwrap_or(false)
    }
}
