use serde::{Deserialize, Serialize};

/// Storage key holding the serialized session list
pub const DEFAULT_VAULT_KEY: &str = "chat_vault";
/// Storage key holding the serialized `AppConfig`
pub const CONFIG_STORAGE_KEY: &str = "chat_vault:config";

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    pub api_key: String,
    pub api_base: Option<String>,
    pub system_prompt: String,
    pub temperature: f32,
    /// Let the model ground answers with web search results
    pub search_grounding: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key: String::new(),
            api_base: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            search_grounding: true,
        }
    }
}

impl CompletionConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    pub fn base_url(&self) -> &str {
        match self.api_base.as_deref() {
            Some(base) if !base.trim().is_empty() => base.trim_end_matches('/'),
            _ => Self::DEFAULT_BASE_URL,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::Auto,
            key: DEFAULT_VAULT_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackendType {
    /// Local storage when available, memory otherwise
    Auto,
    Memory,
    LocalStorage,
}

impl StorageBackendType {
    pub fn all() -> &'static [StorageBackendType] {
        &[
            StorageBackendType::Auto,
            StorageBackendType::Memory,
            StorageBackendType::LocalStorage,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageBackendType::Auto => "Auto-detect",
            StorageBackendType::Memory => "Memory",
            StorageBackendType::LocalStorage => "Local storage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StorageBackendType::Auto => "Uses browser local storage, falls back to memory when it is unavailable.",
            StorageBackendType::Memory => "Volatile. History is lost on page reload.",
            StorageBackendType::LocalStorage => "Persistent browser storage. History survives reloads.",
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, concise assistant. \
When the user attaches images, describe and analyze them carefully. \
Cite your sources when you rely on web results.";
