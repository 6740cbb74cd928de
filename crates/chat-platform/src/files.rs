//! Image picker backed by a detached `<input type="file">`.
//!
//! Opening the dialog is synchronous; reading the chosen files is not.
//! `on_picked` runs from a `spawn_local` task once every file has been
//! read, with the files in the order the browser listed them.

use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

use chat_types::{ChatError, Result};

/// One file chosen in the dialog, fully read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    /// Browser-reported type, empty when unknown
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PickedFile {
    /// Borrowed `(name, mime, bytes)` triple for `AttachmentStaging::stage_files`
    pub fn as_parts(&self) -> (&str, &str, &[u8]) {
        (&self.name, &self.mime_type, &self.bytes)
    }
}

/// Open the browser file dialog for images (multiple selection allowed).
///
/// Must run close to a user gesture or the browser may refuse to open it.
/// Nothing is reported when the user cancels.
pub fn pick_images<F>(on_picked: F) -> Result<()>
where
    F: FnOnce(Vec<PickedFile>) + 'static,
{
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ChatError::JsInterop("No document available".to_string()))?;
    let input: HtmlInputElement = document
        .create_element("input")
        .map_err(|e| ChatError::JsInterop(format!("{:?}", e)))?
        .dyn_into()
        .map_err(|_| ChatError::JsInterop("Created element is not an input".to_string()))?;
    input.set_type("file");
    input.set_accept("image/*");
    input.set_multiple(true);

    let target = input.clone();
    let on_change = Closure::once_into_js(move || {
        let files = selected_files(&target);
        wasm_bindgen_futures::spawn_local(async move {
            on_picked(read_files(files).await);
        });
    });
    input.set_onchange(Some(on_change.unchecked_ref()));
    input.click();
    Ok(())
}

fn selected_files(input: &HtmlInputElement) -> Vec<File> {
    let Some(list) = input.files() else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

/// Read each file in turn; unreadable files are logged and left out.
async fn read_files(files: Vec<File>) -> Vec<PickedFile> {
    let mut picked = Vec::with_capacity(files.len());
    for file in files {
        match JsFuture::from(file.array_buffer()).await {
            Ok(buffer) => picked.push(PickedFile {
                name: file.name(),
                mime_type: file.type_(),
                bytes: Uint8Array::new(&buffer).to_vec(),
            }),
            Err(e) => log::warn!("Could not read {}: {:?}", file.name(), e),
        }
    }
    picked
}
