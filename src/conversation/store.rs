//! In-memory session store

use crate::context::ConversationState;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Shared, lockable handle to one session's state
pub type SessionHandle = Arc<Mutex<ConversationState>>;

/// Maps session ids to their conversation state.
///
/// Sessions are created on first reference and live as long as the store.
/// Each session sits behind its own async mutex so requests for the same id
/// apply their mutations one at a time.
#[derive(Default)]
pub struct ConversationStore {
    sessions: DashMap<String, SessionHandle>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic get-or-insert: concurrent first touches of an id share one state
    pub fn get_or_create(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.get(session_id) {
            return handle.value().clone();
        }

        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!("Creating session {}", session_id);
                Arc::new(Mutex::new(ConversationState::new(session_id)))
            })
            .value()
            .clone()
    }

    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Copy of a session's current state
    pub async fn snapshot(&self, session_id: &str) -> Option<ConversationState> {
        let handle = self.get(session_id)?;
        let state = handle.lock().await;
        Some(state.clone())
    }

    /// Number of known sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
