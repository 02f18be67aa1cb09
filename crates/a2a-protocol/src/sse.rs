//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary chunks from the transport; the decoder buffers
//! partial lines and yields one [`SseEvent`] per blank-line-terminated block.
//! Line endings may be `\n` or `\r\n`. Comment lines (leading `:`) are
//! skipped and multi-line `data` fields are joined with `\n`.
//!
//! A line still unterminated after [`MAX_LINE_BYTES`] bytes is an error.

use crate::error::{ProtocolError, Result};

/// Default cap on one unterminated line.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// A single dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to hold no newline
    scanned: usize,
    max_line: usize,
    event: Option<String>,
    id: Option<String>,
    data: Vec<String>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that rejects lines longer than `max_line` bytes.
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_line,
            event: None,
            id: None,
            data: Vec::new(),
        }
    }

    /// Feed a chunk of bytes and collect every event it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let newline = self.scanned + offset;
            self.scanned = 0;
            if newline > self.max_line {
                return Err(ProtocolError::LineTooLong(self.max_line));
            }

            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let line = std::str::from_utf8(&line)?;
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }

        if self.buffer.len() > self.max_line {
            return Err(ProtocolError::LineTooLong(self.max_line));
        }
        self.scanned = self.buffer.len();

        Ok(events)
    }

    /// Flush a trailing event that was not followed by a blank line.
    pub fn finish(&mut self) -> Result<Option<SseEvent>> {
        if !self.buffer.is_empty() {
            self.scanned = 0;
            let rest = std::mem::take(&mut self.buffer);
            let line = std::str::from_utf8(&rest)?.trim_end_matches('\r').to_string();
            if let Some(event) = self.process_line(&line) {
                return Ok(Some(event));
            }
        }
        Ok(self.dispatch())
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // retry and unknown fields carry nothing the relay uses
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data.is_empty() {
            self.event = None;
            return None;
        }

        Some(SseEvent {
            event: self.event.take(),
            id: self.id.clone(),
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }
}
