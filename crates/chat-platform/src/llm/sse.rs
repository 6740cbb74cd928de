//! Incremental Server-Sent Events decoder.
//!
//! Bytes arrive in arbitrary chunks (a line, a UTF-8 sequence or an event
//! may be split across reads). The decoder buffers until a line is complete
//! and emits the joined `data:` payload of each event when the blank line
//! that terminates it arrives.

use chat_types::{ChatError, Result};

/// A single line longer than this means the stream is corrupt.
const MAX_SSE_BUFFER_BYTES: usize = 1_048_576;

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the payloads of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut consumed = 0;
        while let Some(rel_pos) = self.buffer[consumed..].iter().position(|&b| b == b'\n') {
            let newline_pos = consumed + rel_pos;
            let line = String::from_utf8_lossy(&self.buffer[consumed..newline_pos]).into_owned();
            consumed = newline_pos + 1;
            self.take_line(line.trim_end_matches('\r'), &mut events);
        }
        if consumed > 0 {
            self.buffer.drain(..consumed);
        }

        if self.buffer.len() > MAX_SSE_BUFFER_BYTES {
            return Err(ChatError::Completion(format!(
                "SSE line exceeded {} bytes, aborting stream",
                MAX_SSE_BUFFER_BYTES
            )));
        }
        Ok(events)
    }

    /// Flush at end of stream: a trailing line without newline and an event
    /// without its closing blank line still count.
    pub fn finish(&mut self) -> Vec<String> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let line = String::from_utf8_lossy(&self.buffer).into_owned();
            self.buffer.clear();
            self.take_line(line.trim_end_matches('\r'), &mut events);
        }
        self.dispatch(&mut events);
        events
    }

    fn take_line(&mut self, line: &str, events: &mut Vec<String>) {
        if line.is_empty() {
            self.dispatch(events);
            return;
        }
        // Comment / keep-alive
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        // event:, id: and retry: carry nothing the provider uses
        if field == "data" {
            self.data.push(value.to_string());
        }
    }

    fn dispatch(&mut self, events: &mut Vec<String>) {
        if !self.data.is_empty() {
            events.push(self.data.join("\n"));
            self.data.clear();
        }
    }
}
