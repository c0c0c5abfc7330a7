//! SSE (Server-Sent Events) streaming utilities
//!
//! Buffering and parsing helpers for the `streamGenerateContent` response
//! stream from Vertex AI.

use crate::vertex::types::GenerateContentResponse;

/// Buffer for accumulating incomplete SSE lines across chunk boundaries.
///
/// SSE data arrives as byte chunks that may not align with line boundaries,
/// and a chunk boundary can fall in the middle of a multi-byte UTF-8
/// character. The buffer therefore holds raw bytes and only decodes once a
/// complete line (ending with \n) is available.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    /// Accumulated incomplete line data
    incomplete: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self {
            incomplete: Vec::new(),
        }
    }

    /// Feed bytes into the buffer and return any complete lines.
    ///
    /// Complete lines are those ending with `\n`; the newline is stripped.
    /// Incomplete trailing data is retained for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.incomplete.extend_from_slice(bytes);

        let mut complete_lines = Vec::new();
        while let Some(newline_pos) = self.incomplete.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.incomplete.drain(..=newline_pos).collect();
            let line = &line[..line.len() - 1];

            // Skip empty lines (SSE uses double newlines as separators)
            if !line.is_empty() {
                complete_lines.push(String::from_utf8_lossy(line).into_owned());
            }
        }

        complete_lines
    }

    /// Whether truncated data remains at end of stream
    pub fn has_incomplete(&self) -> bool {
        !self.incomplete.is_empty()
    }
}

/// Extract the payload of an SSE `data:` line, if it is one
pub fn sse_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

/// Parse one Gemini SSE data payload and pull out its text delta.
///
/// Returns None for chunks with no text (metadata-only chunks, unparseable
/// payloads).
pub fn chunk_text(payload: &str) -> Option<String> {
    let response: GenerateContentResponse = serde_json::from_str(payload).ok()?;
    let text = response.text();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
