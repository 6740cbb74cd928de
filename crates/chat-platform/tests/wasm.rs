//! WASM-target tests for chat-platform (Node.js runtime).
//!
//! Tests MemoryStorage, backend selection, the SSE decoder and the Gemini
//! chunk parser under wasm32-unknown-unknown via `wasm-pack test --node`.
//!
//! localStorage needs a browser window; under Node the auto-detection
//! falls back to memory.

use wasm_bindgen_test::*;

use chat_core::ports::{CompletionPort, StoragePort};
use chat_core::store::SessionStore;
use chat_platform::llm::gemini::{parse_chunk, GeminiProvider};
use chat_platform::llm::SseDecoder;
use chat_platform::storage::{auto_detect_storage, LocalStorage, MemoryStorage};
use chat_types::config::{CompletionConfig, StorageBackendType};
use chat_types::ChatError;
use futures::StreamExt;
use std::rc::Rc;

// ─── MemoryStorage Tests ─────────────────────────────────

#[wasm_bindgen_test]
fn memory_storage_backend_name() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
fn memory_storage_set_get_delete() {
    let storage = MemoryStorage::new();
    storage.set("key", "value").unwrap();
    assert_eq!(storage.get("key").unwrap().as_deref(), Some("value"));
    storage.delete("key").unwrap();
    assert!(storage.get("key").unwrap().is_none());
}

#[wasm_bindgen_test]
fn memory_storage_backs_session_store() {
    let storage = Rc::new(MemoryStorage::new());
    let store = SessionStore::open(storage.clone(), "vault");
    assert_eq!(store.len(), 1);
    assert!(storage.get("vault").unwrap().unwrap().starts_with('['));
}

// ─── Backend Selection Tests ─────────────────────────────

#[wasm_bindgen_test]
fn auto_detect_memory_when_configured() {
    let storage = auto_detect_storage(StorageBackendType::Memory);
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
fn auto_detect_falls_back_without_window() {
    assert!(LocalStorage::open().is_err());
    let storage = auto_detect_storage(StorageBackendType::Auto);
    assert_eq!(storage.backend_name(), "memory");
}

// ─── Streaming Tests ─────────────────────────────────────

#[wasm_bindgen_test]
fn sse_decoder_split_event() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"data: {\"candidates\":[]").unwrap().is_empty());
    assert_eq!(decoder.push(b"}\n\n").unwrap(), vec!["{\"candidates\":[]}"]);
}

#[wasm_bindgen_test]
fn gemini_chunk_with_sources() {
    let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hi"}]},"groundingMetadata":{"groundingChunks":[{"web":{"uri":"u","title":"A"}}]}}]}"#;
    let fragment = parse_chunk(data).unwrap().unwrap();
    assert_eq!(fragment.text, "Hi");
    assert_eq!(fragment.citations[0].title, "A");
}

#[wasm_bindgen_test]
async fn gemini_without_key_fails_fast() {
    let provider = GeminiProvider::new(CompletionConfig::default());
    let handle = provider.create_conversation();
    let mut stream = provider.stream_reply(handle, "hello", &[]);
    assert!(matches!(stream.next().await, Some(Err(ChatError::Config(_)))));
    assert!(stream.next().await.is_none());
}
