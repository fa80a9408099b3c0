//! Incremental decoder for the answer service's event stream
//!
//! The streaming search endpoint responds with blank-line-separated blocks:
//!
//! ```text
//! event: answer_chunk
//! data: {"chunk":"Rust is"}
//!
//! ```
//!
//! [`FrameDecoder`] turns raw body chunks into [`Frame`]s. Chunks may split
//! anywhere, including in the middle of a multi-byte UTF-8 sequence or a
//! field line, so the decoder carries incomplete bytes and incomplete blocks
//! across calls. Text after the last blank line stays buffered; a truncated
//! trailing block is never emitted.

use serde_json::Value;

/// One decoded stream frame: an event name plus its payload.
///
/// The payload is the `data:` line parsed as JSON; a line that is not valid
/// JSON degrades to a JSON string of the raw text rather than failing the
/// stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub event: String,
    pub data: Value,
}

/// Incremental frame decoder.
///
/// Feed it body chunks as they arrive; each call returns the frames
/// completed by that chunk, in arrival order. The decoder is cheap to
/// construct and holds only the undecoded remainder between calls.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence from the last chunk.
    carry: Vec<u8>,
    /// Decoded text not yet terminated by a blank line.
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next body chunk.
    ///
    /// Returns every frame completed by this chunk. Blocks missing an
    /// `event:` or `data:` line are dropped silently.
    ///
    /// # Arguments
    ///
    /// * `chunk` - Raw bytes from the response body, split at any boundary.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.absorb(chunk);

        let mut frames = Vec::new();
        // Blocks are separated by blank lines (`\n\n`).
        while let Some(pos) = self.buffer.find("\n\n") {
            let block = self.buffer[..pos].to_string();
            self.buffer.drain(..pos + 2);
            if let Some(frame) = decode_block(&block) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Append a chunk to the text buffer, carrying any incomplete UTF-8
    /// sequence at the end of the chunk into the next call.
    fn absorb(&mut self, chunk: &[u8]) {
        self.carry.extend_from_slice(chunk);
        loop {
            match std::str::from_utf8(&self.carry) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.carry.clear();
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.carry[..valid]) {
                        self.buffer.push_str(text);
                    }
                    match err.error_len() {
                        // Invalid bytes, not a split sequence: substitute
                        // and keep decoding the rest of the chunk.
                        Some(len) => {
                            self.buffer.push('\u{FFFD}');
                            self.carry.drain(..valid + len);
                        }
                        // Incomplete trailing sequence: wait for more bytes.
                        None => {
                            self.carry.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Decode a single block (the text between two blank lines).
///
/// The first line starting with `event:` names the event and the first line
/// starting with `data:` carries the payload; both are required. Field
/// values are trimmed of surrounding whitespace.
fn decode_block(block: &str) -> Option<Frame> {
    let event = block.lines().find_map(|line| line.strip_prefix("event:"))?;
    let raw = block.lines().find_map(|line| line.strip_prefix("data:"))?;
    let raw = raw.trim();

    let data =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    Some(Frame {
        event: event.trim().to_string(),
        data,
    })
}
