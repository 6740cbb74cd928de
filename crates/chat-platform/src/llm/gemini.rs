//! Google Gemini streaming adapter.
//!
//! Speaks `streamGenerateContent` with `alt=sse` through browser `fetch()`
//! (gloo-net), reading the response body incrementally. Conversation memory
//! is kept client-side: every handle owns the turn history that is replayed
//! with each request.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use async_trait::async_trait;
use futures::stream;
use gloo_net::http::Request;
use js_sys::{Reflect, Uint8Array};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

use chat_core::attachments::parse_data_uri;
use chat_core::ports::*;
use chat_types::{
    ChatError, Result,
    config::CompletionConfig,
    message::GroundingSource,
};
use super::sse::SseDecoder;

type Histories = Rc<RefCell<HashMap<ConversationHandle, Vec<Content>>>>;

pub struct GeminiProvider {
    config: CompletionConfig,
    histories: Histories,
    next_handle: Cell<u64>,
}

impl GeminiProvider {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            histories: Rc::new(RefCell::new(HashMap::new())),
            next_handle: Cell::new(0),
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Completed turns recorded for `handle`, oldest first.
    pub fn history(&self, handle: ConversationHandle) -> Vec<Content> {
        self.histories
            .borrow()
            .get(&handle)
            .cloned()
            .unwrap_or_default()
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url(),
            model_path(&self.config.model)
        )
    }
}

#[async_trait(?Send)]
impl CompletionPort for GeminiProvider {
    fn create_conversation(&self) -> ConversationHandle {
        let handle = ConversationHandle(self.next_handle.get() + 1);
        self.next_handle.set(handle.0);
        self.histories.borrow_mut().insert(handle, Vec::new());
        log::debug!("Gemini conversation {} created", handle.0);
        handle
    }

    fn stream_reply(
        &self,
        handle: ConversationHandle,
        prompt: &str,
        attachments: &[String],
    ) -> FragmentStream {
        if !self.config.has_api_key() {
            return Box::pin(stream::once(async {
                Err(ChatError::Config(
                    "No Gemini API key configured. Add one in Settings.".to_string(),
                ))
            }));
        }

        let user = user_turn(prompt, attachments);
        let body = build_request_body(&self.config, &self.history(handle), &user);
        let reply = ReplyStream {
            request: Some(PreparedRequest {
                url: self.stream_url(),
                api_key: self.config.api_key.clone(),
                body,
            }),
            phase: Phase::Idle,
            decoder: SseDecoder::new(),
            queue: VecDeque::new(),
            reply_text: String::new(),
            commit: Some(PendingTurn {
                histories: self.histories.clone(),
                handle,
                user,
            }),
        };

        Box::pin(stream::unfold(reply, |mut reply| async move {
            reply.next_item().await.map(|item| (item, reply))
        }))
    }

    fn release_conversation(&self, handle: ConversationHandle) {
        self.histories.borrow_mut().remove(&handle);
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/v1beta/models", self.config.base_url());

        let response = Request::get(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(ChatError::Completion(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let data: ApiModelList = response
            .json()
            .await
            .map_err(|e| ChatError::Completion(e.to_string()))?;

        Ok(model_names(data))
    }
}

// ─── Reply stream ────────────────────────────────────────────

struct PreparedRequest {
    url: String,
    api_key: String,
    body: Value,
}

/// Turn to record once the reply has streamed to the end without error
struct PendingTurn {
    histories: Histories,
    handle: ConversationHandle,
    user: Content,
}

enum Phase {
    Idle,
    Reading(ReadableStreamDefaultReader),
    Finished,
}

struct ReplyStream {
    request: Option<PreparedRequest>,
    phase: Phase,
    decoder: SseDecoder,
    queue: VecDeque<Result<Fragment>>,
    reply_text: String,
    commit: Option<PendingTurn>,
}

impl ReplyStream {
    async fn next_item(&mut self) -> Option<Result<Fragment>> {
        loop {
            if let Some(item) = self.queue.pop_front() {
                match &item {
                    Ok(fragment) => self.reply_text.push_str(&fragment.text),
                    Err(_) => {
                        self.queue.clear();
                        self.phase = Phase::Finished;
                        self.commit = None;
                    }
                }
                return Some(item);
            }

            match std::mem::replace(&mut self.phase, Phase::Finished) {
                Phase::Finished => {
                    self.commit_turn();
                    return None;
                }
                Phase::Idle => match self.open().await {
                    Ok(reader) => self.phase = Phase::Reading(reader),
                    Err(e) => self.queue.push_back(Err(e)),
                },
                Phase::Reading(reader) => match read_chunk(&reader).await {
                    Ok(Some(bytes)) => {
                        match self.decoder.push(&bytes).and_then(|events| self.enqueue(events)) {
                            Ok(()) => self.phase = Phase::Reading(reader),
                            Err(e) => {
                                let _ = reader.cancel();
                                self.queue.push_back(Err(e));
                            }
                        }
                    }
                    Ok(None) => {
                        let events = self.decoder.finish();
                        if let Err(e) = self.enqueue(events) {
                            self.queue.push_back(Err(e));
                        }
                    }
                    Err(e) => self.queue.push_back(Err(e)),
                },
            }
        }
    }

    fn enqueue(&mut self, events: Vec<String>) -> Result<()> {
        for data in events {
            if let Some(fragment) = parse_chunk(&data)? {
                self.queue.push_back(Ok(fragment));
            }
        }
        Ok(())
    }

    async fn open(&mut self) -> Result<ReadableStreamDefaultReader> {
        let request = self
            .request
            .take()
            .ok_or_else(|| ChatError::Other("Reply stream already opened".to_string()))?;

        let response = Request::post(&request.url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &request.api_key)
            .json(&request.body)
            .map_err(|e| ChatError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ChatError::Completion(format!(
                "HTTP {}: {}",
                status,
                error_message(&text)
            )));
        }

        let body = response
            .body()
            .ok_or_else(|| ChatError::Completion("Response has no body".to_string()))?;
        Ok(body.get_reader().unchecked_into())
    }

    fn commit_turn(&mut self) {
        let Some(turn) = self.commit.take() else {
            return;
        };
        let mut histories = turn.histories.borrow_mut();
        // Released while the reply was streaming
        let Some(history) = histories.get_mut(&turn.handle) else {
            return;
        };
        history.push(turn.user);
        history.push(Content::model(std::mem::take(&mut self.reply_text)));
    }
}

/// Next chunk of the body, or `None` once the reader reports done.
async fn read_chunk(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>> {
    let result = JsFuture::from(reader.read())
        .await
        .map_err(|e| ChatError::Network(format!("{:?}", e)))?;

    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(|e| ChatError::JsInterop(format!("{:?}", e)))?
        .as_bool()
        .unwrap_or(false);
    if done {
        return Ok(None);
    }

    let value = Reflect::get(&result, &JsValue::from_str("value"))
        .map_err(|e| ChatError::JsInterop(format!("{:?}", e)))?;
    Ok(Some(Uint8Array::new(&value).to_vec()))
}

// ─── Wire types ──────────────────────────────────────────────

/// One turn of a Gemini conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiChunk {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    content: Option<ApiContent>,
    grounding_metadata: Option<ApiGroundingMetadata>,
}

#[derive(Deserialize)]
struct ApiContent {
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Deserialize)]
struct ApiPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<ApiGroundingChunk>,
}

#[derive(Deserialize)]
struct ApiGroundingChunk {
    web: Option<ApiWebSource>,
}

#[derive(Deserialize)]
struct ApiWebSource {
    title: Option<String>,
    uri: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
pub(crate) struct ApiModelList {
    #[serde(default)]
    models: Vec<ApiModel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

// ─── Helpers ─────────────────────────────────────────────────

/// Bare model id for the URL path (`models/gemini-x` → `gemini-x`).
pub fn model_path(model: &str) -> &str {
    let model = model.trim();
    model.strip_prefix("models/").unwrap_or(model)
}

/// The user turn for a prompt: inline image parts first, then the text.
/// Attachments that are not base64 data URIs are skipped.
pub fn user_turn(prompt: &str, attachments: &[String]) -> Content {
    let mut parts: Vec<Part> = attachments
        .iter()
        .filter_map(|uri| match parse_data_uri(uri) {
            Ok(inline) => Some(Part::InlineData {
                inline_data: Blob {
                    mime_type: inline.mime_type,
                    data: inline.data,
                },
            }),
            Err(e) => {
                log::warn!("Skipping attachment: {}", e);
                None
            }
        })
        .collect();

    if !prompt.is_empty() || parts.is_empty() {
        parts.push(Part::Text {
            text: prompt.to_string(),
        });
    }

    Content {
        role: "user".to_string(),
        parts,
    }
}

pub fn build_request_body(config: &CompletionConfig, history: &[Content], turn: &Content) -> Value {
    let contents: Vec<&Content> = history.iter().chain(std::iter::once(turn)).collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": config.temperature,
        },
    });

    if !config.system_prompt.trim().is_empty() {
        body["systemInstruction"] = json!({
            "parts": [{ "text": config.system_prompt }]
        });
    }

    if config.search_grounding {
        body["tools"] = json!([{ "googleSearch": {} }]);
    }

    body
}

/// Map one SSE payload to a fragment.
///
/// Returns `Ok(None)` for payloads that carry nothing to show (metadata-only
/// chunks, unreadable JSON) and an error for API error payloads.
pub fn parse_chunk(data: &str) -> Result<Option<Fragment>> {
    let chunk: ApiChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            log::warn!("Ignoring unreadable stream chunk: {}", e);
            return Ok(None);
        }
    };

    if let Some(error) = chunk.error {
        return Err(ChatError::Completion(describe(&error)));
    }

    let Some(candidate) = chunk.candidates.into_iter().next() else {
        return Ok(None);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let citations: Vec<GroundingSource> = candidate
        .grounding_metadata
        .map(|meta| {
            meta.grounding_chunks
                .into_iter()
                .filter_map(|c| c.web)
                .filter_map(|web| {
                    let uri = web.uri?;
                    let title = web.title.unwrap_or_else(|| uri.clone());
                    Some(GroundingSource::new(title, uri))
                })
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() && citations.is_empty() {
        return Ok(None);
    }
    Ok(Some(Fragment::text(text).with_citations(citations)))
}

/// Human-readable message from an HTTP error body, or the body itself.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => describe(&parsed.error),
        Err(_) => body.trim().to_string(),
    }
}

fn describe(error: &ApiError) -> String {
    let message = if error.message.is_empty() {
        "unknown API error"
    } else {
        error.message.as_str()
    };
    match &error.status {
        Some(status) => format!("{} ({})", message, status),
        None => message.to_string(),
    }
}

pub(crate) fn model_names(list: ApiModelList) -> Vec<String> {
    list.models
        .into_iter()
        .filter(|m| {
            m.supported_generation_methods.is_empty()
                || m.supported_generation_methods.iter().any(|g| g == "generateContent")
        })
        .map(|m| model_path(&m.name).to_string())
        .collect()
}
