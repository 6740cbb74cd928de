//! WASM-target tests for chat-types.
//!
//! Mirrors the native unit tests but runs under wasm32-unknown-unknown
//! via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use chat_types::message::*;
use chat_types::session::*;
use chat_types::config::*;

// ─── Message Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn message_user() {
    let msg = Message::user("Hello", Vec::new());
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.text, "Hello");
}

#[wasm_bindgen_test]
fn message_sources_are_monotonic() {
    let mut msg = Message::model_placeholder();
    msg.apply(MessagePatch::text("a").with_sources(vec![GroundingSource::new("A", "u")]));
    msg.apply(MessagePatch::text("ab").with_sources(Vec::new()));
    assert_eq!(msg.sources().len(), 1);
    assert_eq!(msg.text, "ab");
}

// ─── Session Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn session_roundtrip_keeps_timestamps() {
    let mut session = ChatSession::new();
    session.messages.push(Message::user("hi", Vec::new()));
    session.messages.push(Message::model_placeholder());

    let json = serde_json::to_string(&session).unwrap();
    let back: ChatSession = serde_json::from_str(&json).unwrap();
    assert_eq!(back, session);
}

#[wasm_bindgen_test]
fn title_rule() {
    assert_eq!(title_from_text(""), FALLBACK_SESSION_TITLE);
    assert_eq!(title_from_text("short"), "short");
    assert_eq!(title_from_text(&"x".repeat(64)).len(), TITLE_MAX_CHARS);
}

// ─── Config Tests ────────────────────────────────────────

#[wasm_bindgen_test]
fn default_config() {
    let config = AppConfig::default();
    assert_eq!(config.storage.key, DEFAULT_VAULT_KEY);
    assert_eq!(config.completion.base_url(), CompletionConfig::DEFAULT_BASE_URL);
}
