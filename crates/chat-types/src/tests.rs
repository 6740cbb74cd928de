#[cfg(test)]
mod tests {
    use crate::message::*;
    use crate::session::*;
    use crate::event::*;
    use crate::config::*;
    use crate::error::*;
    use chrono::{TimeZone, Utc};

    // ─── Message Tests ───────────────────────────────────────

    #[test]
    fn test_message_user() {
        let msg = Message::user("Hello", vec!["data:image/png;base64,AA==".to_string()]);
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text, "Hello");
        assert_eq!(msg.attachments.len(), 1);
        assert!(msg.grounding_sources.is_none());
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn test_message_model_placeholder() {
        let msg = Message::model_placeholder();
        assert_eq!(msg.role, Role::Model);
        assert!(msg.text.is_empty());
        assert!(msg.attachments.is_empty());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("a", Vec::new());
        let b = Message::user("a", Vec::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_apply_replaces_text() {
        let mut msg = Message::model_placeholder();
        msg.apply(MessagePatch::text("Hel"));
        msg.apply(MessagePatch::text("Hello"));
        assert_eq!(msg.text, "Hello");
    }

    #[test]
    fn test_apply_sets_sources_when_non_empty() {
        let mut msg = Message::model_placeholder();
        msg.apply(MessagePatch::text("x").with_sources(vec![GroundingSource::new("A", "u")]));
        assert_eq!(msg.sources(), &[GroundingSource::new("A", "u")]);
    }

    #[test]
    fn test_apply_empty_sources_keeps_previous() {
        let mut msg = Message::model_placeholder();
        msg.apply(MessagePatch::text("x").with_sources(vec![GroundingSource::new("A", "u")]));
        msg.apply(MessagePatch::text("xy").with_sources(Vec::new()));
        msg.apply(MessagePatch::text("xyz"));
        assert_eq!(msg.text, "xyz");
        assert_eq!(msg.grounding_sources, Some(vec![GroundingSource::new("A", "u")]));
    }

    #[test]
    fn test_apply_empty_sources_on_fresh_message_stays_none() {
        let mut msg = Message::model_placeholder();
        msg.apply(MessagePatch::text("x").with_sources(Vec::new()));
        assert!(msg.grounding_sources.is_none());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), r#""model""#);
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
    }

    #[test]
    fn test_message_json_uses_camel_case() {
        let mut msg = Message::model_placeholder();
        msg.apply(MessagePatch::text("hi").with_sources(vec![GroundingSource::new("A", "u")]));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("groundingSources"));
        assert!(!json.contains("attachments"), "empty attachments are omitted");
    }

    #[test]
    fn test_message_reads_browser_vault_entry() {
        let raw = r#"{
            "id": "1717000000000",
            "role": "user",
            "text": "What is Rust?",
            "attachments": [],
            "timestamp": "2024-05-29T16:26:40.000Z"
        }"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.timestamp, Utc.with_ymd_and_hms(2024, 5, 29, 16, 26, 40).unwrap());
        assert!(msg.grounding_sources.is_none());
    }

    // ─── Timestamp Tests ─────────────────────────────────────

    #[test]
    fn test_timestamp_accepts_offsets() {
        let dt = crate::timestamp::parse("2024-05-29T18:26:40+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 29, 16, 26, 40).unwrap());
    }

    #[test]
    fn test_timestamp_accepts_naive_as_utc() {
        let dt = crate::timestamp::parse("2024-05-29T16:26:40.5").unwrap();
        assert_eq!(dt.timestamp_millis(), Utc.with_ymd_and_hms(2024, 5, 29, 16, 26, 40).unwrap().timestamp_millis() + 500);
    }

    #[test]
    fn test_timestamp_accepts_epoch_millis() {
        let raw = r#"{"id":"s","title":"t","messages":[],"lastModified":1717000000000}"#;
        let session: ChatSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.last_modified.timestamp_millis(), 1_717_000_000_000);
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        assert!(crate::timestamp::parse("yesterday").is_err());
        let raw = r#"{"id":"s","title":"t","messages":[],"lastModified":"yesterday"}"#;
        assert!(serde_json::from_str::<ChatSession>(raw).is_err());
    }

    #[test]
    fn test_timestamp_roundtrip_is_exact() {
        let session = ChatSession::new();
        let json = serde_json::to_string(&session).unwrap();
        let back: ChatSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.last_modified, session.last_modified);
    }

    // ─── Session Tests ───────────────────────────────────────

    #[test]
    fn test_session_new() {
        let session = ChatSession::with_id("test-id");
        assert_eq!(session.id, "test-id");
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_session_message_lookup() {
        let mut session = ChatSession::new();
        let msg = Message::model_placeholder();
        let id = msg.id.clone();
        session.messages.push(msg);
        assert!(session.message(&id).is_some());
        session.message_mut(&id).unwrap().text.push_str("hi");
        assert_eq!(session.message(&id).unwrap().text, "hi");
        assert!(session.message("missing").is_none());
    }

    #[test]
    fn test_title_from_text_truncates_to_thirty_chars() {
        let title = title_from_text("   Explain the borrow checker in great detail please   ");
        assert_eq!(title, "Explain the borrow checker in ");
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_title_from_text_counts_characters_not_bytes() {
        let title = title_from_text(&"é".repeat(40));
        assert_eq!(title.chars().count(), 30);
    }

    #[test]
    fn test_title_from_empty_text_uses_fallback() {
        assert_eq!(title_from_text(""), FALLBACK_SESSION_TITLE);
        assert_eq!(title_from_text("  \n "), FALLBACK_SESSION_TITLE);
    }

    #[test]
    fn test_session_summary() {
        let mut session = ChatSession::with_id("s1");
        session.messages.push(Message::user("hi", Vec::new()));
        let summary = session.summary();
        assert_eq!(summary.id, "s1");
        assert_eq!(summary.message_count, 1);
        assert_eq!(summary.last_modified, session.last_modified);
    }

    // ─── Event Tests ─────────────────────────────────────────

    #[test]
    fn test_chat_event_serialization() {
        let event = ChatEvent::SendFinished {
            session_id: "s1".to_string(),
            message_id: "m1".to_string(),
            fragments: 3,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("SendFinished"));
        let back: ChatEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.completion.model, "gemini-2.5-flash");
        assert!(config.completion.api_key.is_empty());
        assert!(!config.completion.has_api_key());
        assert!(config.completion.search_grounding);
        assert!(!config.completion.system_prompt.is_empty());
        assert_eq!(config.storage.backend, StorageBackendType::Auto);
        assert_eq!(config.storage.key, DEFAULT_VAULT_KEY);
    }

    #[test]
    fn test_base_url_override() {
        let mut config = CompletionConfig::default();
        assert_eq!(config.base_url(), CompletionConfig::DEFAULT_BASE_URL);

        config.api_base = Some("https://proxy.example.com/".to_string());
        assert_eq!(config.base_url(), "https://proxy.example.com");

        config.api_base = Some("   ".to_string());
        assert_eq!(config.base_url(), CompletionConfig::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"completion":{"api_key":"k"}}"#).unwrap();
        assert_eq!(config.completion.api_key, "k");
        assert_eq!(config.completion.model, "gemini-2.5-flash");
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_storage_backend_labels() {
        assert_eq!(StorageBackendType::all().len(), 3);
        for backend in StorageBackendType::all() {
            assert!(!backend.label().is_empty());
            assert!(!backend.description().is_empty());
        }
    }

    // ─── Error Tests ─────────────────────────────────────────

    #[test]
    fn test_error_display() {
        let err = ChatError::Completion("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Completion error: quota exceeded");

        let err = ChatError::MessageNotFound {
            session_id: "s".to_string(),
            message_id: "m".to_string(),
        };
        assert_eq!(err.to_string(), "Message not found: s/m");
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{{invalid}}").unwrap_err();
        let err: ChatError = serde_err.into();
        assert!(matches!(err, ChatError::Serialization(_)));
    }
}
