//! WASM-target tests for chat-core.
//!
//! Runs SessionStore, SendOrchestrator and attachment tests
//! under wasm32-unknown-unknown via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use chat_core::attachments::*;
use chat_core::event_bus::EventBus;
use chat_core::orchestrator::*;
use chat_core::ports::*;
use chat_core::store::SessionStore;
use chat_types::event::ChatEvent;
use chat_types::message::*;

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

const VAULT: &str = "wasm_vault";

// ─── Mocks ───────────────────────────────────────────────

struct MockStorage {
    data: RefCell<HashMap<String, String>>,
}

impl MockStorage {
    fn new() -> Self {
        Self {
            data: RefCell::new(HashMap::new()),
        }
    }
}

impl StoragePort for MockStorage {
    fn get(&self, key: &str) -> chat_types::Result<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> chat_types::Result<()> {
        self.data.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> chat_types::Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct MockCompletion {
    replies: RefCell<VecDeque<Vec<chat_types::Result<Fragment>>>>,
    created: Cell<u64>,
}

impl MockCompletion {
    fn new(replies: Vec<Vec<chat_types::Result<Fragment>>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            created: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl CompletionPort for MockCompletion {
    fn create_conversation(&self) -> ConversationHandle {
        self.created.set(self.created.get() + 1);
        ConversationHandle(self.created.get())
    }

    fn stream_reply(&self, _: ConversationHandle, _: &str, _: &[String]) -> FragmentStream {
        let reply = self.replies.borrow_mut().pop_front().unwrap_or_default();
        Box::pin(futures::stream::iter(reply))
    }

    async fn list_models(&self) -> chat_types::Result<Vec<String>> {
        Ok(vec!["mock-model".to_string()])
    }
}

fn hello_world() -> Vec<chat_types::Result<Fragment>> {
    vec![
        Ok(Fragment::text("Hel")),
        Ok(Fragment::text("lo")),
        Ok(Fragment::text(" world").with_citations(vec![GroundingSource::new("A", "u")])),
    ]
}

fn orchestrator(completion: Rc<dyn CompletionPort>) -> (SendOrchestrator, EventBus) {
    let store = SessionStore::open(Rc::new(MockStorage::new()), VAULT);
    let bus = EventBus::new();
    let orchestrator = SendOrchestrator::new(Rc::new(RefCell::new(store)), completion, bus.clone());
    (orchestrator, bus)
}

// ─── SessionStore Tests ──────────────────────────────────

#[wasm_bindgen_test]
fn store_opens_with_one_session() {
    let store = SessionStore::open(Rc::new(MockStorage::new()), VAULT);
    assert_eq!(store.len(), 1);
    assert!(store.current().is_some());
}

#[wasm_bindgen_test]
fn store_reopens_identically() {
    let storage = Rc::new(MockStorage::new());
    let before = {
        let mut store = SessionStore::open(storage.clone(), VAULT);
        let id = store.current_id().unwrap().to_string();
        store.append_message(&id, Message::user("persist me", Vec::new())).unwrap();
        store.create_session();
        store.list_sessions().to_vec()
    };
    let store = SessionStore::open(storage, VAULT);
    assert_eq!(store.list_sessions(), before.as_slice());
}

#[wasm_bindgen_test]
fn store_title_from_first_message() {
    let mut store = SessionStore::open(Rc::new(MockStorage::new()), VAULT);
    let id = store.current_id().unwrap().to_string();
    store.append_message(&id, Message::user("Plan a weekend trip to the coast please", Vec::new())).unwrap();
    assert_eq!(store.session(&id).unwrap().title, "Plan a weekend trip to the coa");
}

#[wasm_bindgen_test]
fn store_delete_reassigns_current() {
    let mut store = SessionStore::open(Rc::new(MockStorage::new()), VAULT);
    let first = store.current_id().unwrap().to_string();
    let second = store.create_session().id.clone();
    store.delete_session(&second);
    assert_eq!(store.current_id(), Some(first.as_str()));
}

// ─── Orchestrator Tests ──────────────────────────────────

#[wasm_bindgen_test]
async fn send_streams_reply() {
    let (orchestrator, bus) = orchestrator(Rc::new(MockCompletion::new(vec![hello_world()])));
    let sid = orchestrator.store().borrow().current_id().unwrap().to_string();

    let outcome = orchestrator.send(Some(&sid), "Say hello", Vec::new()).await;
    assert!(matches!(outcome, SendOutcome::Completed { fragments: 3 }));
    assert!(!orchestrator.is_busy());

    let store = orchestrator.store().borrow();
    let messages = &store.session(&sid).unwrap().messages;
    assert_eq!(messages[1].text, "Hello world");
    assert_eq!(messages[1].sources(), &[GroundingSource::new("A", "u")]);
    assert!(matches!(bus.drain().last(), Some(ChatEvent::SendFinished { .. })));
}

#[wasm_bindgen_test]
async fn send_while_busy_is_noop() {
    let (orchestrator, _bus) = orchestrator(Rc::new(MockCompletion::new(vec![hello_world()])));
    let sid = orchestrator.store().borrow().current_id().unwrap().to_string();

    let pending = orchestrator.begin_send(Some(&sid), "first", Vec::new()).unwrap();
    let outcome = orchestrator.send(Some(&sid), "second", Vec::new()).await;
    assert!(matches!(outcome, SendOutcome::Rejected(SendRejected::Busy)));
    assert_eq!(orchestrator.store().borrow().session(&sid).unwrap().messages.len(), 2);

    orchestrator.complete_send(pending).await;
    assert!(!orchestrator.is_busy());
}

#[wasm_bindgen_test]
async fn stream_error_keeps_partial_text() {
    let reply = vec![
        Ok(Fragment::text("partial")),
        Err(chat_types::ChatError::Network("reset".to_string())),
    ];
    let (orchestrator, _bus) = orchestrator(Rc::new(MockCompletion::new(vec![reply])));
    let sid = orchestrator.store().borrow().current_id().unwrap().to_string();

    let outcome = orchestrator.send(Some(&sid), "q", Vec::new()).await;
    assert!(matches!(outcome, SendOutcome::Failed { fragments: 1, .. }));
    assert!(!orchestrator.is_busy());
    assert_eq!(orchestrator.store().borrow().session(&sid).unwrap().messages[1].text, "partial");
}

#[wasm_bindgen_test]
async fn handle_reused_per_session() {
    let completion = Rc::new(MockCompletion::new(vec![hello_world(), hello_world()]));
    let (orchestrator, _bus) = orchestrator(completion.clone());
    let sid = orchestrator.store().borrow().current_id().unwrap().to_string();

    orchestrator.send(Some(&sid), "one", Vec::new()).await;
    orchestrator.send(Some(&sid), "two", Vec::new()).await;
    assert_eq!(completion.created.get(), 1);

    orchestrator.delete_session(&sid);
    assert!(!orchestrator.has_conversation(&sid));
}

// ─── Attachment Tests ────────────────────────────────────

#[wasm_bindgen_test]
fn data_uri_roundtrip() {
    let uri = encode_data_uri("image/gif", &[0x47, 0x49, 0x46]);
    let inline = parse_data_uri(&uri).unwrap();
    assert_eq!(inline.mime_type, "image/gif");
    assert_eq!(inline.data, "R0lG");
}

#[wasm_bindgen_test]
fn composer_take_clears() {
    let mut composer = Composer::new();
    composer.text = "look".to_string();
    composer.staging.stage_file("x.png", "image/png", &[1]).unwrap();
    let (text, attachments) = composer.take();
    assert_eq!(text, "look");
    assert_eq!(attachments.len(), 1);
    assert!(!composer.is_submittable());
}
