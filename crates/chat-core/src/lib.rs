//! Chat core: the session/message state machine and the streaming loop.
//!
//! Everything here is platform-agnostic; browser adapters plug in through
//! the traits in [`ports`].

pub mod ports;
pub mod event_bus;
pub mod store;
pub mod ingest;
pub mod orchestrator;
pub mod attachments;
