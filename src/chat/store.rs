// src/chat/store.rs
//! In-memory session collection shared by the sidebar and the transcript.

use crate::models::chat::{Session, SessionId};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedStore = Arc<RwLock<SessionStore>>;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    selected: Option<SessionId>,
    last_issued_ms: i64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Creates an empty session with the placeholder title and selects it.
    pub fn create_session(&mut self) -> &Session {
        self.create_session_at(chrono::Utc::now().timestamp_millis())
    }

    /// Ids come from the clock; two sessions created in the same millisecond
    /// (or after a clock step backwards) get the next free value instead.
    pub fn create_session_at(&mut self, now_ms: i64) -> &Session {
        let millis = if now_ms > self.last_issued_ms {
            now_ms
        } else {
            self.last_issued_ms + 1
        };
        self.last_issued_ms = millis;

        let session = Session::new(SessionId::from_millis(millis));
        tracing::debug!("Creating new chat {}", session.id);
        self.selected = Some(session.id.clone());
        self.sessions.push(session);
        &self.sessions[self.sessions.len() - 1]
    }

    /// Returns false, leaving the selection untouched, for an unknown id.
    pub fn select(&mut self, id: &SessionId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    pub fn selected_id(&self) -> Option<&SessionId> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&Session> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    /// Swaps in `session` wholesale for the entry with the same id.
    pub fn replace(&mut self, session: Session) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(slot) => {
                tracing::debug!("Updating chat {} ({} messages)", session.id, session.messages.len());
                *slot = session;
                true
            }
            None => false,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
