use serde::{Deserialize, Serialize};

/// Events emitted by the chat core.
/// UI subscribes to these for status updates; transcript content itself is
/// read straight from the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A session was created and made current
    SessionCreated { session_id: String },

    /// A session was removed from the store
    SessionDeleted { session_id: String },

    /// A send was accepted; `message_id` is the model placeholder
    SendStarted { session_id: String, message_id: String },

    /// One fragment was folded into the placeholder
    FragmentApplied { session_id: String, message_id: String, text_len: usize },

    /// The reply stream was exhausted
    SendFinished { session_id: String, message_id: String, fragments: usize },

    /// The reply stream failed; partial text stays in place
    SendFailed { session_id: String, message_id: String, message: String },
}

impl ChatEvent {
    /// The session this event concerns.
    pub fn session_id(&self) -> &str {
        match self {
            ChatEvent::SessionCreated { session_id }
            | ChatEvent::SessionDeleted { session_id }
            | ChatEvent::SendStarted { session_id, .. }
            | ChatEvent::FragmentApplied { session_id, .. }
            | ChatEvent::SendFinished { session_id, .. }
            | ChatEvent::SendFailed { session_id, .. } => session_id,
        }
    }
}
