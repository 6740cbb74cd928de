//! UI-level state that drives rendering.
//!
//! Transcript content is read from the session store each frame; this holds
//! only what the store does not know: the composer, panel toggles and the
//! send status derived from draining the EventBus.

use chat_core::attachments::Composer;
use chat_types::event::ChatEvent;

/// State visible to UI panels
pub struct UiState {
    /// Input text and staged attachments
    pub composer: Composer,
    /// Whether settings panel is open
    pub show_settings: bool,
    /// Whether the session list is shown
    pub show_sidebar: bool,
    /// Status line text
    pub status_text: String,
    /// Model placeholder currently receiving fragments
    pub streaming_message: Option<String>,
    /// Most recent send failure, cleared by the next send
    pub last_error: Option<String>,
    /// One-line notice for the composer (rejected drops and the like)
    pub notice: Option<String>,
    busy: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            composer: Composer::new(),
            show_settings: false,
            show_sidebar: true,
            status_text: "Ready".to_string(),
            streaming_message: None,
            last_error: None,
            notice: None,
            busy: false,
        }
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<ChatEvent>) {
        for event in events {
            match event {
                ChatEvent::SessionCreated { .. } => {
                    self.last_error = None;
                }
                ChatEvent::SessionDeleted { session_id } => {
                    log::debug!("UI saw deletion of {}", session_id);
                }
                ChatEvent::SendStarted { message_id, .. } => {
                    self.busy = true;
                    self.streaming_message = Some(message_id);
                    self.last_error = None;
                    self.notice = None;
                    self.status_text = "Thinking...".to_string();
                }
                ChatEvent::FragmentApplied { .. } => {
                    self.status_text = "Streaming...".to_string();
                }
                ChatEvent::SendFinished { .. } => {
                    self.busy = false;
                    self.streaming_message = None;
                    self.status_text = "Ready".to_string();
                }
                ChatEvent::SendFailed { message, .. } => {
                    self.busy = false;
                    self.streaming_message = None;
                    self.status_text = format!("Error: {}", message);
                    self.last_error = Some(message);
                }
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_streaming(&self, message_id: &str) -> bool {
        self.streaming_message.as_deref() == Some(message_id)
    }

    /// Stage `(name, mime, bytes)` files from a drop or the file dialog.
    /// Rejections are summed up in the composer notice.
    pub fn stage_files<'a, I>(&mut self, files: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a [u8])>,
    {
        let before = self.composer.staging.len();
        let rejected = self.composer.staging.stage_files(files);
        let staged = self.composer.staging.len() - before;
        if staged > 0 {
            log::info!("Staged {} image(s)", staged);
        }
        for e in &rejected {
            log::warn!("Attachment rejected: {}", e);
        }
        self.notice = match rejected.as_slice() {
            [] => None,
            [only] => Some(only.to_string()),
            [first, rest @ ..] => Some(format!("{} (and {} more)", first, rest.len())),
        };
    }

    /// True when the Send button should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.busy && self.composer.is_submittable()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
