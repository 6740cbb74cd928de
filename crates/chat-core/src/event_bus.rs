//! Event queue between the chat core and the UI.
//!
//! The orchestrator pushes from inside `spawn_local` tasks; the UI takes
//! everything once per frame. Events stay in emission order, also within
//! the per-session view.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use chat_types::event::ChatEvent;

/// Shared handle to one queue; clones push to and drain the same events.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Rc<RefCell<VecDeque<ChatEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ChatEvent) {
        log::trace!("event {:?}", event);
        self.queue.borrow_mut().push_back(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&self) -> Vec<ChatEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// Take the pending events of one session and leave the others queued.
    pub fn drain_for(&self, session_id: &str) -> Vec<ChatEvent> {
        let mut queue = self.queue.borrow_mut();
        let (taken, kept): (Vec<_>, Vec<_>) = queue
            .drain(..)
            .partition(|event| event.session_id() == session_id);
        *queue = VecDeque::from(kept);
        taken
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending() > 0
    }
}
