//! Send orchestrator: drives one user send through
//! pending → streaming → settled.
//!
//! 1. Validate (single-flight, non-empty input, known session)
//! 2. Append the user message and an empty model placeholder
//! 3. Resolve the session's conversation handle (created on first use)
//! 4. Fold the reply stream into the placeholder
//! 5. Clear the in-flight flag, whatever the stream did
//!
//! Stream failures are logged and swallowed: the placeholder keeps whatever
//! text arrived before the error.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chat_types::{event::ChatEvent, message::Message, ChatError};
use crate::attachments::Composer;
use crate::event_bus::EventBus;
use crate::ingest::{ingest_reply, IngestSummary, ReplyRequest};
use crate::ports::{CompletionPort, ConversationHandle};
use crate::store::SessionStore;

/// Why a send was turned away. Rejections are silent no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    /// A previous reply is still streaming
    Busy,
    /// No text and no attachments
    EmptyInput,
    /// No current session, or the session no longer exists
    NoSession,
}

#[derive(Debug, Clone)]
pub enum SendOutcome {
    Rejected(SendRejected),
    Completed { fragments: usize },
    /// The stream failed after `fragments` were applied
    Failed { error: ChatError, fragments: usize },
}

/// Holds the single-flight flag for the lifetime of a send.
struct InFlightGuard(Rc<Cell<bool>>);

impl InFlightGuard {
    fn acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
        if flag.get() {
            return None;
        }
        flag.set(true);
        Some(Self(flag.clone()))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A send that has been accepted and recorded but not yet streamed.
pub struct PendingSend {
    pub session_id: String,
    /// Id of the model placeholder the stream will fill
    pub message_id: String,
    request: ReplyRequest,
    completion: Rc<dyn CompletionPort>,
    guard: InFlightGuard,
}

pub struct SendOrchestrator {
    store: Rc<RefCell<SessionStore>>,
    completion: RefCell<Rc<dyn CompletionPort>>,
    conversations: RefCell<HashMap<String, ConversationHandle>>,
    in_flight: Rc<Cell<bool>>,
    event_bus: EventBus,
}

impl SendOrchestrator {
    pub fn new(
        store: Rc<RefCell<SessionStore>>,
        completion: Rc<dyn CompletionPort>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            completion: RefCell::new(completion),
            conversations: RefCell::new(HashMap::new()),
            in_flight: Rc::new(Cell::new(false)),
            event_bus,
        }
    }

    pub fn store(&self) -> &Rc<RefCell<SessionStore>> {
        &self.store
    }

    /// True while a reply is streaming.
    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    /// Swap the completion capability (after a settings change).
    /// Existing conversation handles belong to the old one and are dropped.
    pub fn set_completion(&self, completion: Rc<dyn CompletionPort>) {
        self.conversations.borrow_mut().clear();
        *self.completion.borrow_mut() = completion;
    }

    // ─── Sessions ────────────────────────────────────────────

    /// Create a session and make it current. Returns its id.
    pub fn new_session(&self) -> String {
        let id = self.store.borrow_mut().create_session().id.clone();
        self.event_bus.emit(ChatEvent::SessionCreated { session_id: id.clone() });
        id
    }

    /// Delete a session and its conversation handle. The store is never
    /// left empty: deleting the last session starts a fresh one.
    pub fn delete_session(&self, id: &str) -> bool {
        let (deleted, now_empty) = {
            let mut store = self.store.borrow_mut();
            let deleted = store.delete_session(id);
            (deleted, store.is_empty())
        };
        if !deleted {
            return false;
        }
        self.forget_session(id);
        self.event_bus.emit(ChatEvent::SessionDeleted { session_id: id.to_string() });
        if now_empty {
            self.new_session();
        }
        true
    }

    /// Drop the conversation handle cached for a session.
    pub fn forget_session(&self, id: &str) {
        if let Some(handle) = self.conversations.borrow_mut().remove(id) {
            self.completion.borrow().release_conversation(handle);
        }
    }

    pub fn has_conversation(&self, session_id: &str) -> bool {
        self.conversations.borrow().contains_key(session_id)
    }

    fn conversation_for(&self, session_id: &str, completion: &dyn CompletionPort) -> ConversationHandle {
        *self
            .conversations
            .borrow_mut()
            .entry(session_id.to_string())
            .or_insert_with(|| completion.create_conversation())
    }

    // ─── Sending ─────────────────────────────────────────────

    fn validate(
        &self,
        session_id: Option<&str>,
        text: &str,
        no_attachments: bool,
    ) -> Result<String, SendRejected> {
        if self.is_busy() {
            return Err(SendRejected::Busy);
        }
        if text.trim().is_empty() && no_attachments {
            return Err(SendRejected::EmptyInput);
        }
        let session_id = session_id.ok_or(SendRejected::NoSession)?;
        if self.store.borrow().session(session_id).is_none() {
            return Err(SendRejected::NoSession);
        }
        Ok(session_id.to_string())
    }

    /// Validate the composer, then capture and clear it and start the send.
    /// A rejected submit leaves the composer untouched.
    pub fn submit(
        &self,
        session_id: Option<&str>,
        composer: &mut Composer,
    ) -> Result<PendingSend, SendRejected> {
        self.validate(session_id, &composer.text, composer.staging.is_empty())?;
        let (text, attachments) = composer.take();
        self.begin_send(session_id, &text, attachments)
    }

    /// Record the user message and model placeholder and raise the
    /// in-flight flag. Nothing goes over the network until
    /// [`complete_send`](Self::complete_send).
    pub fn begin_send(
        &self,
        session_id: Option<&str>,
        text: &str,
        attachments: Vec<String>,
    ) -> Result<PendingSend, SendRejected> {
        let session_id = self.validate(session_id, text, attachments.is_empty())?;
        let guard = InFlightGuard::acquire(&self.in_flight).ok_or(SendRejected::Busy)?;

        let prompt = text.trim().to_string();
        let placeholder = Message::model_placeholder();
        let message_id = placeholder.id.clone();
        {
            let mut store = self.store.borrow_mut();
            let user = Message::user(prompt.clone(), attachments.clone());
            if store.append_message(&session_id, user).is_err()
                || store.append_message(&session_id, placeholder).is_err()
            {
                return Err(SendRejected::NoSession);
            }
        }

        let completion = self.completion.borrow().clone();
        let handle = self.conversation_for(&session_id, completion.as_ref());

        log::info!(
            "Send started in session {} ({} attachment(s))",
            session_id,
            attachments.len()
        );
        self.event_bus.emit(ChatEvent::SendStarted {
            session_id: session_id.clone(),
            message_id: message_id.clone(),
        });

        Ok(PendingSend {
            session_id,
            message_id,
            request: ReplyRequest {
                handle,
                prompt,
                attachments,
            },
            completion,
            guard,
        })
    }

    /// Stream the reply for an accepted send into its placeholder.
    pub async fn complete_send(&self, pending: PendingSend) -> SendOutcome {
        let PendingSend {
            session_id,
            message_id,
            request,
            completion,
            guard,
        } = pending;

        let mut progress = IngestSummary::default();
        let result = ingest_reply(completion.as_ref(), &request, &mut progress, |patch| {
            let text_len = patch.text.as_ref().map_or(0, String::len);
            self.store
                .borrow_mut()
                .update_message(&session_id, &message_id, patch)?;
            log::debug!("Fragment applied to {} ({} bytes)", message_id, text_len);
            self.event_bus.emit(ChatEvent::FragmentApplied {
                session_id: session_id.clone(),
                message_id: message_id.clone(),
                text_len,
            });
            Ok(())
        })
        .await;
        drop(guard);

        match result {
            Ok(()) => {
                log::info!("Reply complete in session {} ({} fragments)", session_id, progress.fragments);
                self.event_bus.emit(ChatEvent::SendFinished {
                    session_id,
                    message_id,
                    fragments: progress.fragments,
                });
                SendOutcome::Completed { fragments: progress.fragments }
            }
            Err(error) => {
                log::error!("Reply stream failed in session {}: {}", session_id, error);
                self.event_bus.emit(ChatEvent::SendFailed {
                    session_id,
                    message_id,
                    message: error.to_string(),
                });
                SendOutcome::Failed {
                    error,
                    fragments: progress.fragments,
                }
            }
        }
    }

    /// Validate, record and stream in one go.
    pub async fn send(
        &self,
        session_id: Option<&str>,
        text: &str,
        attachments: Vec<String>,
    ) -> SendOutcome {
        match self.begin_send(session_id, text, attachments) {
            Ok(pending) => self.complete_send(pending).await,
            Err(reason) => {
                log::debug!("Send rejected: {:?}", reason);
                SendOutcome::Rejected(reason)
            }
        }
    }
}
