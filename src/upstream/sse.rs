//! Incremental server-sent-event framing
//!
//! The status endpoint streams `data: {...}` frames separated by blank lines.
//! Some deployments emit bare JSON lines instead, so a line that starts with
//! `{` outside a pending frame is surfaced as a frame on its own.

use bytes::Bytes;

/// One decoded frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Line-buffered frame decoder; feed it chunks in arrival order
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw chunk, returning every frame it completed
    pub fn push_bytes(&mut self, chunk: &Bytes) -> Vec<SseFrame> {
        self.push_raw(chunk)
    }

    pub fn push_str(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.push_raw(chunk.as_bytes())
    }

    // Lines are decoded only once complete so multi-byte characters split
    // across chunks survive.
    fn push_raw(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            self.process_line(line.trim_end_matches(['\n', '\r']), &mut frames);
        }

        frames
    }

    /// Flush whatever is left once the stream closed
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        let raw = std::mem::take(&mut self.buffer);
        let rest = String::from_utf8_lossy(&raw);
        let rest = rest.trim_end_matches('\r');
        if !rest.is_empty() {
            self.process_line(rest, &mut frames);
        }
        self.flush(&mut frames);
        frames
    }

    fn process_line(&mut self, line: &str, frames: &mut Vec<SseFrame>) {
        if line.is_empty() {
            self.flush(frames);
            return;
        }
        // Comment / keep-alive
        if line.starts_with(':') {
            return;
        }
        if let Some(value) = line.strip_prefix("data:") {
            self.data_lines.push(value.trim_start().to_string());
            return;
        }
        if let Some(value) = line.strip_prefix("event:") {
            let value = value.trim();
            self.event = (!value.is_empty()).then(|| value.to_string());
            return;
        }
        if line.starts_with('{') && self.data_lines.is_empty() {
            frames.push(SseFrame {
                event: None,
                data: line.to_string(),
            });
        }
        // `id:` and `retry:` fields carry nothing we use
    }

    fn flush(&mut self, frames: &mut Vec<SseFrame>) {
        if self.data_lines.is_empty() {
            self.event = None;
            return;
        }
        frames.push(SseFrame {
            event: self.event.take(),
            data: self.data_lines.join("\n"),
        });
        self.data_lines.clear();
    }
}
