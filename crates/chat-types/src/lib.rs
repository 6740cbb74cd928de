pub mod message;
pub mod session;
pub mod event;
pub mod config;
pub mod error;
pub mod timestamp;

#[cfg(test)]
mod tests;

pub use error::ChatError;
pub type Result<T> = std::result::Result<T, ChatError>;

/// Fresh opaque identifier for sessions and messages.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
