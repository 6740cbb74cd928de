use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message in a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Model => "Assistant",
            Role::System => "System",
        }
    }
}

/// A citation the model grounded its answer on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

impl GroundingSource {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// A single message in a session transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Inline `data:` URIs, user messages only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    /// Model messages only; never regresses to empty once set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

impl Message {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: crate::new_id(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            attachments: Vec::new(),
            grounding_sources: None,
        }
    }

    pub fn user(text: impl Into<String>, attachments: Vec<String>) -> Self {
        Self {
            attachments,
            ..Self::new(Role::User, text)
        }
    }

    /// Empty model message that the ingestion loop fills in.
    pub fn model_placeholder() -> Self {
        Self::new(Role::Model, String::new())
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// Merge a streaming update into this message.
    ///
    /// Text is replaced wholesale when present. Sources are only taken when
    /// the patch carries at least one, so an update without citations keeps
    /// whatever was attached earlier.
    pub fn apply(&mut self, patch: MessagePatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(sources) = patch.grounding_sources {
            if !sources.is_empty() {
                self.grounding_sources = Some(sources);
            }
        }
    }

    pub fn sources(&self) -> &[GroundingSource] {
        self.grounding_sources.as_deref().unwrap_or(&[])
    }
}

/// Partial update to a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePatch {
    pub text: Option<String>,
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

impl MessagePatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            grounding_sources: None,
        }
    }

    pub fn with_sources(mut self, sources: Vec<GroundingSource>) -> Self {
        self.grounding_sources = Some(sources);
        self
    }
}
