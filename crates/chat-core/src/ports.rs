//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `chat-core` (pure Rust).
//! Implementations live in `chat-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::pin::Pin;
use async_trait::async_trait;
use futures::Stream;
use chat_types::{message::GroundingSource, Result};

// ─── Completion Port ─────────────────────────────────────────

/// One incremental piece of a streamed reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Text to append to what has streamed so far
    pub text: String,
    /// Citations carried by this fragment, possibly none
    pub citations: Vec<GroundingSource>,
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations(mut self, citations: Vec<GroundingSource>) -> Self {
        self.citations = citations;
        self
    }
}

/// Lazy, single-consumer reply stream. Not restartable.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment>>>>;

/// Opaque multi-turn context allocated by a completion capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationHandle(pub u64);

#[async_trait(?Send)]
pub trait CompletionPort {
    /// Allocate a conversation context with no prior turns.
    fn create_conversation(&self) -> ConversationHandle;

    /// Submit a prompt with its attachments and stream the reply.
    ///
    /// Nothing is sent until the stream is first polled.
    fn stream_reply(
        &self,
        handle: ConversationHandle,
        prompt: &str,
        attachments: &[String],
    ) -> FragmentStream;

    /// Drop any context held for `handle`.
    fn release_conversation(&self, _handle: ConversationHandle) {}

    /// List model names usable with this capability
    async fn list_models(&self) -> Result<Vec<String>>;
}

// ─── Storage Port ────────────────────────────────────────────

/// Synchronous string-keyed durable storage (browser local storage shape).
pub trait StoragePort {
    /// Get a value by key
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value
    fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}
