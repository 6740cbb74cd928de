//! Session store: the single owner of every session and message.
//!
//! The whole list is mirrored to one storage key after each mutation.
//! Sessions are kept newest-first; exactly one is current whenever the list
//! is non-empty.

use std::rc::Rc;
use chat_types::{
    ChatError, Result,
    message::{Message, MessagePatch},
    session::{title_from_text, ChatSession, SessionSummary},
};
use crate::ports::StoragePort;

pub struct SessionStore {
    sessions: Vec<ChatSession>,
    current: Option<String>,
    storage: Rc<dyn StoragePort>,
    key: String,
}

impl SessionStore {
    /// Load the store from `key`, falling back to an empty list when the
    /// stored value is missing or unreadable. A fresh session is created if
    /// nothing was loaded.
    pub fn open(storage: Rc<dyn StoragePort>, key: impl Into<String>) -> Self {
        let key = key.into();
        let sessions = load_sessions(storage.as_ref(), &key);
        let current = sessions.first().map(|s| s.id.clone());
        log::info!(
            "Session store opened on {} with {} session(s)",
            storage.backend_name(),
            sessions.len()
        );

        let mut store = Self {
            sessions,
            current,
            storage,
            key,
        };
        if store.sessions.is_empty() {
            store.create_session();
        }
        store
    }

    pub fn list_sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(ChatSession::summary).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&ChatSession> {
        self.current.as_deref().and_then(|id| self.session(id))
    }

    /// Create an empty session at the head of the list and make it current.
    pub fn create_session(&mut self) -> &ChatSession {
        let session = ChatSession::new();
        log::info!("Created session {}", session.id);
        self.current = Some(session.id.clone());
        self.sessions.insert(0, session);
        self.persist();
        &self.sessions[0]
    }

    /// Remove a session. Returns false when the id is unknown.
    pub fn delete_session(&mut self, id: &str) -> bool {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            return false;
        };
        self.sessions.remove(index);
        if self.current.as_deref() == Some(id) {
            self.current = self.sessions.first().map(|s| s.id.clone());
        }
        log::info!("Deleted session {}", id);
        self.persist();
        true
    }

    /// Make an existing session current.
    pub fn select_session(&mut self, id: &str) -> bool {
        if self.session(id).is_none() {
            return false;
        }
        self.current = Some(id.to_string());
        true
    }

    /// Append to a transcript. The first message also names the session.
    pub fn append_message(&mut self, session_id: &str, message: Message) -> Result<()> {
        let session = self.session_mut(session_id)?;
        if session.messages.is_empty() {
            session.title = title_from_text(&message.text);
        }
        session.messages.push(message);
        session.touch();
        self.persist();
        Ok(())
    }

    /// Merge a streaming update into one message.
    pub fn update_message(
        &mut self,
        session_id: &str,
        message_id: &str,
        patch: MessagePatch,
    ) -> Result<()> {
        let session = self.session_mut(session_id)?;
        let message = session
            .message_mut(message_id)
            .ok_or_else(|| ChatError::MessageNotFound {
                session_id: session_id.to_string(),
                message_id: message_id.to_string(),
            })?;
        message.apply(patch);
        session.touch();
        self.persist();
        Ok(())
    }

    fn session_mut(&mut self, id: &str) -> Result<&mut ChatSession> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ChatError::SessionNotFound(id.to_string()))
    }

    /// Write the full list under the store key. Failures are logged only;
    /// the in-memory list stays authoritative.
    fn persist(&self) {
        let result = serde_json::to_string(&self.sessions)
            .map_err(ChatError::from)
            .and_then(|json| self.storage.set(&self.key, &json));
        if let Err(e) = result {
            log::error!("Failed to persist sessions to {}: {}", self.storage.backend_name(), e);
        }
    }
}

fn load_sessions(storage: &dyn StoragePort, key: &str) -> Vec<ChatSession> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("Could not read session vault: {}", e);
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(sessions) => sessions,
        Err(e) => {
            log::warn!("Discarding malformed session vault: {}", e);
            Vec::new()
        }
    }
}
