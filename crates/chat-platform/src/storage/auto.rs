//! Pick a storage backend from the configured preference.
//!
//! Priority: localStorage → Memory (fallback)

use std::rc::Rc;
use chat_core::ports::StoragePort;
use chat_types::config::StorageBackendType;
use super::{LocalStorage, MemoryStorage};

/// Open the requested backend, falling back to memory when local storage
/// cannot be reached. Never fails; returns a trait object so callers are
/// backend-agnostic.
pub fn auto_detect_storage(backend: StorageBackendType) -> Rc<dyn StoragePort> {
    if backend == StorageBackendType::Memory {
        log::info!("Storage backend: memory (configured)");
        return Rc::new(MemoryStorage::new());
    }

    match LocalStorage::open() {
        Ok(local) => {
            log::info!("Storage backend: localStorage");
            Rc::new(local)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryStorage::new())
        }
    }
}
