//! Attachment staging and the composer the UI types into.
//!
//! Images are held as self-contained `data:` URIs until the next send
//! snapshots and clears them.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chat_types::{ChatError, Result};

/// Decoded parts of a `data:<mime>;base64,<payload>` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    /// Still base64-encoded
    pub data: String,
}

pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

pub fn parse_data_uri(uri: &str) -> Result<InlineData> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ChatError::InvalidAttachment("not a data URI".to_string()))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| ChatError::InvalidAttachment("data URI has no payload".to_string()))?;
    let mime_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| ChatError::InvalidAttachment("data URI is not base64-encoded".to_string()))?;
    if mime_type.is_empty() {
        return Err(ChatError::InvalidAttachment("data URI has no MIME type".to_string()));
    }
    Ok(InlineData {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

/// Image MIME type from a file extension, for drops that arrive untyped.
pub fn guess_image_mime(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Ordered list of images waiting for the next send
#[derive(Debug, Clone, Default)]
pub struct AttachmentStaging {
    items: Vec<String>,
}

impl AttachmentStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode and stage an image file. Non-image files are rejected.
    pub fn stage_file(&mut self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<()> {
        let mime_type = if mime_type.is_empty() {
            guess_image_mime(file_name).unwrap_or_default()
        } else {
            mime_type
        };
        if !mime_type.starts_with("image/") {
            return Err(ChatError::InvalidAttachment(format!(
                "{} is not an image ({})",
                file_name,
                if mime_type.is_empty() { "unknown type" } else { mime_type }
            )));
        }
        self.items.push(encode_data_uri(mime_type, bytes));
        Ok(())
    }

    /// Stage a batch of `(name, mime, bytes)` files in order. Rejected files
    /// are skipped and their errors returned; the rest are still staged.
    pub fn stage_files<'a, I>(&mut self, files: I) -> Vec<ChatError>
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a [u8])>,
    {
        files
            .into_iter()
            .filter_map(|(name, mime_type, bytes)| self.stage_file(name, mime_type, bytes).err())
            .collect()
    }

    pub fn push(&mut self, data_uri: String) {
        self.items.push(data_uri);
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Snapshot and clear.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

/// Pending user input: the text box plus staged images
#[derive(Debug, Clone, Default)]
pub struct Composer {
    pub text: String,
    pub staging: AttachmentStaging,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when there is something worth sending.
    pub fn is_submittable(&self) -> bool {
        !self.text.trim().is_empty() || !self.staging.is_empty()
    }

    /// Snapshot the trimmed text and attachments, leaving the composer empty.
    pub fn take(&mut self) -> (String, Vec<String>) {
        let text = std::mem::take(&mut self.text).trim().to_string();
        (text, self.staging.take())
    }
}
