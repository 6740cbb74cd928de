//! Streaming ingestion loop.
//!
//! Folds a reply stream into a single model message. Each fragment produces
//! exactly one patch, in arrival order, carrying the full text accumulated so
//! far. The loop never touches the store directly: the caller hands in a sink
//! that knows which (session, message) pair to update.

use futures::{Stream, StreamExt};
use chat_types::{message::MessagePatch, Result};
use crate::ports::{CompletionPort, ConversationHandle, Fragment};

/// Result of a fully consumed stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub fragments: usize,
    pub text: String,
}

/// A prompt bound for a conversation
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub handle: ConversationHandle,
    pub prompt: String,
    pub attachments: Vec<String>,
}

/// Open the reply stream for `request` and fold it through `sink`.
pub async fn ingest_reply<F>(
    completion: &dyn CompletionPort,
    request: &ReplyRequest,
    progress: &mut IngestSummary,
    sink: F,
) -> Result<()>
where
    F: FnMut(MessagePatch) -> Result<()>,
{
    let stream = completion.stream_reply(request.handle, &request.prompt, &request.attachments);
    fold_fragments(stream, progress, sink).await
}

/// Consume `fragments` to exhaustion, emitting one patch per fragment.
///
/// `progress` is updated before each sink call, so on error it still
/// describes what was applied.
pub async fn fold_fragments<S, F>(
    fragments: S,
    progress: &mut IngestSummary,
    mut sink: F,
) -> Result<()>
where
    S: Stream<Item = Result<Fragment>>,
    F: FnMut(MessagePatch) -> Result<()>,
{
    let mut fragments = std::pin::pin!(fragments);
    while let Some(fragment) = fragments.next().await {
        let Fragment { text, citations } = fragment?;
        progress.text.push_str(&text);
        progress.fragments += 1;

        let mut patch = MessagePatch::text(progress.text.clone());
        if !citations.is_empty() {
            patch = patch.with_sources(citations);
        }
        sink(patch)?;
    }
    Ok(())
}
