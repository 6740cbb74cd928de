//! Persisted `AppConfig`, stored as JSON beside the session vault.

use std::rc::Rc;
use chat_core::orchestrator::SendOrchestrator;
use chat_core::ports::StoragePort;
use chat_types::{
    config::{AppConfig, CompletionConfig, CONFIG_STORAGE_KEY},
    Result,
};
use crate::llm::GeminiProvider;

/// Restore the saved config. Missing or unreadable values give the defaults.
pub fn load_config(storage: &dyn StoragePort) -> AppConfig {
    match storage.get(CONFIG_STORAGE_KEY) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(config) => {
                log::info!("Config restored from {}", storage.backend_name());
                config
            }
            Err(e) => {
                log::warn!("Ignoring malformed saved config: {}", e);
                AppConfig::default()
            }
        },
        Ok(None) => AppConfig::default(),
        Err(e) => {
            log::warn!("Could not read saved config: {}", e);
            AppConfig::default()
        }
    }
}

pub fn save_config(storage: &dyn StoragePort, config: &AppConfig) -> Result<()> {
    let json = serde_json::to_string(config)?;
    storage.set(CONFIG_STORAGE_KEY, &json)?;
    log::info!("Config saved to {}", storage.backend_name());
    Ok(())
}

/// Point the orchestrator at a provider for `completion`. The current
/// provider, and with it every session's conversation memory, is kept when
/// its settings already match. Returns the provider in use afterwards.
pub fn apply_completion_config(
    orchestrator: &SendOrchestrator,
    current: &Rc<GeminiProvider>,
    completion: &CompletionConfig,
) -> Rc<GeminiProvider> {
    if current.config() == completion {
        log::debug!("Completion settings unchanged, keeping conversations");
        return current.clone();
    }
    log::info!("Completion settings changed, switching to {}", completion.model);
    let provider = Rc::new(GeminiProvider::new(completion.clone()));
    orchestrator.set_completion(provider.clone());
    provider
}
