//! Browser platform adapters: implements chat-core port traits via wasm-bindgen.
//!
//! - `storage`: local storage and in-memory key/value backends
//! - `llm`: the Gemini streaming completion provider
//! - `config`: saving and restoring `AppConfig`, applying completion settings
//! - `files`: the image file picker

pub mod storage;
pub mod llm;
pub mod config;
pub mod files;
