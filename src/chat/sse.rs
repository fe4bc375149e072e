//! Server-sent event decoding for streamed completions

use tracing::{debug, warn};

use crate::gateway::StreamChunk;

const DONE_SENTINEL: &str = "[DONE]";

/// Longest line kept; anything longer is dropped up to its newline
pub const MAX_LINE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Incremental reply content
    Token(String),
    /// End-of-stream sentinel
    Done,
}

/// Incremental `data:` line decoder
///
/// Bytes are buffered until a full line is available, so chunk boundaries
/// may fall anywhere, including inside a multi-byte character. Only the
/// unterminated tail is buffered, so each byte is scanned once. Nothing is
/// decoded after the sentinel.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Inside an oversized line, skipping to its newline
    overflowed: bool,
    done: bool,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one transport chunk, returning the events it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        if self.done {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut rest = chunk;
        while !self.done
            && let Some(end) = rest.iter().position(|b| *b == b'\n')
        {
            let (line, tail) = rest.split_at(end + 1);
            rest = tail;
            if self.take_partial(line) {
                let line = std::mem::take(&mut self.buffer);
                events.extend(self.decode_line(&line));
            }
            self.overflowed = false;
        }

        if self.done {
            self.buffer.clear();
        } else {
            self.take_partial(rest);
        }
        events
    }

    /// Flush a trailing unterminated line at transport close
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        if self.done || self.overflowed || rest.is_empty() {
            return Vec::new();
        }
        self.decode_line(&rest).into_iter().collect()
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Append to the current line unless it grew past the limit
    fn take_partial(&mut self, bytes: &[u8]) -> bool {
        if self.overflowed {
            return false;
        }
        if self.buffer.len() + bytes.len() > MAX_LINE_BYTES {
            warn!(limit = MAX_LINE_BYTES, "Dropping oversized stream line");
            self.buffer = Vec::new();
            self.overflowed = true;
            return false;
        }
        self.buffer.extend_from_slice(bytes);
        true
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<SseEvent> {
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!(error = %e, "Skipping stream line that is not UTF-8");
                return None;
            }
        };

        // Comments, `event:` and `id:` lines carry nothing for us
        let data = line.strip_prefix("data:")?.trim_start();

        if data == DONE_SENTINEL {
            debug!("Stream sentinel received");
            self.done = true;
            return Some(SseEvent::Done);
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => chunk
                .into_token()
                .filter(|token| !token.is_empty())
                .map(SseEvent::Token),
            Err(e) => {
                warn!(error = %e, data, "Skipping undecodable stream fragment");
                None
            }
        }
    }
}
