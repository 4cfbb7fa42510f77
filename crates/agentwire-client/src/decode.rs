//! Event stream decoding.
//!
//! The run stream is SSE-style text: `field: value` lines, with a blank line
//! closing each event group. Decoding happens in two stages:
//!
//! - [`FrameDecoder`] turns raw byte chunks into [`Frame`]s. Chunks can end
//!   anywhere (mid-line, mid-CRLF, mid code point), so any unterminated tail
//!   is carried over to the next chunk.
//! - [`EventAssembler`] folds frames into [`AgentEvent`]s.
//!
//! [`EventParser`] owns one of each and is what the transport drives.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::types::{AgentEvent, DEFAULT_EVENT_TAG};

// ─────────────────────────────────────────────────────────────────────────────
// Frames
// ─────────────────────────────────────────────────────────────────────────────

/// Field names that carry meaning in the run stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameField {
    Event,
    Data,
}

impl FrameField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "event" => Some(FrameField::Event),
            "data" => Some(FrameField::Data),
            _ => None,
        }
    }

    /// Field name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameField::Event => "event",
            FrameField::Data => "data",
        }
    }
}

/// One decoded line of the run stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A recognized `field: value` line; `value` is trimmed.
    Field { field: FrameField, value: String },
    /// A blank line ending the current event group.
    Boundary,
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame decoder
// ─────────────────────────────────────────────────────────────────────────────

/// Splits byte chunks into frames, carrying partial lines across chunks.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the frames of every line it completes.
    ///
    /// The unterminated tail stays buffered until a later chunk ends it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            if let Some(frame) = parse_line(&self.buffer[start..end]) {
                frames.push(frame);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);

        frames
    }

    /// Flush the final unterminated line at end of stream.
    pub fn finish(&mut self) -> Vec<Frame> {
        let tail = std::mem::take(&mut self.buffer);
        if tail.is_empty() {
            return Vec::new();
        }
        parse_line(&tail).into_iter().collect()
    }

    /// Bytes waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Parse one line without its `\n` terminator.
fn parse_line(raw: &[u8]) -> Option<Frame> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);

    if line.trim().is_empty() {
        return Some(Frame::Boundary);
    }

    // Lines without a colon, comments (`: ...`) and unknown fields carry nothing.
    let (name, value) = line.split_once(':')?;
    let Some(field) = FrameField::parse(name) else {
        tracing::trace!(field = name, "ignoring unrecognized stream field");
        return None;
    };

    Some(Frame::Field {
        field,
        value: value.trim().to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Event assembler
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulates frames into complete events.
#[derive(Debug, Default)]
pub struct EventAssembler {
    event: Option<String>,
    data: Option<serde_json::Value>,
}

impl EventAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one frame, returning an event when a boundary completes one.
    ///
    /// A `data` value that is not valid JSON fails with [`Error::Decode`].
    pub fn push(&mut self, frame: Frame) -> Result<Option<AgentEvent>> {
        match frame {
            Frame::Field {
                field: FrameField::Event,
                value,
            } => {
                self.event = Some(value);
                Ok(None)
            }
            Frame::Field {
                field: FrameField::Data,
                value,
            } => {
                let data = serde_json::from_str(&value).map_err(|source| Error::Decode {
                    payload: value.clone(),
                    source,
                })?;
                self.data = Some(data);
                Ok(None)
            }
            Frame::Boundary => Ok(self.take()),
        }
    }

    /// Emit the pending event at end of stream, if it has any field set.
    pub fn finish(&mut self) -> Option<AgentEvent> {
        self.take()
    }

    /// Whether any field has been collected since the last event.
    pub fn is_pending(&self) -> bool {
        self.event.is_some() || self.data.is_some()
    }

    fn take(&mut self) -> Option<AgentEvent> {
        if !self.is_pending() {
            return None;
        }
        let event = self.event.take();
        let data = self.data.take();
        Some(AgentEvent {
            event: event.unwrap_or_else(|| DEFAULT_EVENT_TAG.to_string()),
            data: data.unwrap_or(serde_json::Value::Null),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────────────────────────────────────

/// Decoder and assembler for a single stream.
#[derive(Debug, Default)]
pub struct EventParser {
    decoder: FrameDecoder,
    assembler: EventAssembler,
}

impl EventParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, appending completed events to `out` in wire order.
    ///
    /// On a malformed payload, events completed earlier in the same chunk
    /// are already in `out` when the error is returned.
    pub fn feed(&mut self, chunk: &[u8], out: &mut VecDeque<AgentEvent>) -> Result<()> {
        let frames = self.decoder.push(chunk);
        self.apply(frames, out)
    }

    /// Flush the trailing line and pending event at end of stream.
    pub fn finish(&mut self, out: &mut VecDeque<AgentEvent>) -> Result<()> {
        let frames = self.decoder.finish();
        self.apply(frames, out)?;
        out.extend(self.assembler.finish());
        Ok(())
    }

    fn apply(&mut self, frames: Vec<Frame>, out: &mut VecDeque<AgentEvent>) -> Result<()> {
        for frame in frames {
            if let Some(event) = self.assembler.push(frame)? {
                out.push_back(event);
            }
        }
        Ok(())
    }
}

/// Decode a complete body in one pass.
pub fn parse_all(body: &[u8]) -> Result<Vec<AgentEvent>> {
    let mut parser = EventParser::new();
    let mut events = VecDeque::new();
    parser.feed(body, &mut events)?;
    parser.finish(&mut events)?;
    Ok(events.into())
}
