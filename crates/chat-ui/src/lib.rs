//! egui presentation layer for Chat Vault.
//!
//! Panels read sessions straight from the store and report user intent back
//! to the app as plain values; they never call into the core themselves.

pub mod state;
pub mod theme;
pub mod panels;
