//! Incremental decoder for undelimited JSON streams
//!
//! The feed writes JSON values back to back with no length prefix or
//! separator. Bytes are appended at the tail of a text buffer and complete
//! values are split off the head one at a time; framing comes from JSON
//! syntax alone.

use serde_json::error::Category;
use serde_json::{Deserializer, Value};
use tracing::{debug, trace};

use crate::error::{ClientError, Result};

const JSON_WHITESPACE: [char; 4] = [' ', '\t', '\n', '\r'];

/// Splits complete JSON values off the front of a growing buffer.
///
/// Values nested deeper than serde_json's recursion limit (128) are reported
/// as malformed, even while still incomplete.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Decoded text not yet consumed into a value
    buf: String,
    /// Trailing bytes of a UTF-8 sequence split across chunks
    pending: Vec<u8>,
    /// Bytes consumed since the stream started, for error offsets
    consumed: usize,
    max_buffer: Option<usize>,
    /// Set once the source reported end of stream
    finished: bool,
}

impl StreamDecoder {
    /// Create an unbounded decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder that fails once `limit` unconsumed bytes are
    /// buffered without forming a value
    pub fn with_max_buffer(limit: Option<usize>) -> Self {
        Self {
            max_buffer: limit,
            ..Self::default()
        }
    }

    /// Append a received chunk to the tail of the buffer.
    ///
    /// Invalid UTF-8 is dropped so a stray byte between values never breaks
    /// framing. A multi-byte sequence cut by the chunk boundary is held back
    /// until the next chunk completes it.
    pub fn extend(&mut self, chunk: &[u8]) {
        let joined;
        let mut rest: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut carried = std::mem::take(&mut self.pending);
            carried.extend_from_slice(chunk);
            joined = carried;
            &joined
        };

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buf.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.buf
                        .push_str(std::str::from_utf8(&rest[..valid]).unwrap_or_default());
                    match err.error_len() {
                        Some(len) => {
                            trace!(bytes = len, "Dropping invalid UTF-8");
                            rest = &rest[valid + len..];
                        }
                        None => {
                            self.pending.extend_from_slice(&rest[valid..]);
                            break;
                        }
                    }
                }
            }
        }

        trace!(
            chunk_len = chunk.len(),
            buffered = self.buf.len(),
            "Appended chunk"
        );
    }

    /// Try to split one complete value off the head of the buffer.
    ///
    /// `Ok(None)` means the buffer holds no complete value yet. Nothing is
    /// discarded in that case except leading whitespace.
    pub fn next_value(&mut self) -> Result<Option<Value>> {
        let start = self.buf.len() - self.buf.trim_start_matches(JSON_WHITESPACE).len();
        if start == self.buf.len() {
            self.consume(start);
            return Ok(None);
        }

        let parsed = {
            let mut values = Deserializer::from_str(&self.buf[start..]).into_iter::<Value>();
            values
                .next()
                .map(|result| result.map(|value| (value, start + values.byte_offset())))
        };

        match parsed {
            Some(Ok((value, end))) => {
                // A bare number touching the end of the buffer may still grow.
                if value.is_number() && end == self.buf.len() && !self.finished {
                    return self.incomplete();
                }
                self.consume(end);
                debug!(consumed = end, buffered = self.buf.len(), "Decoded value");
                Ok(Some(value))
            }
            Some(Err(err)) if err.classify() == Category::Eof => self.incomplete(),
            Some(Err(err)) => Err(ClientError::MalformedStream {
                offset: self.consumed + start,
                reason: err.to_string(),
            }),
            None => {
                self.consume(self.buf.len());
                Ok(None)
            }
        }
    }

    /// Iterate over the values currently buffered, stopping at the first
    /// incomplete value or error
    pub fn values(&mut self) -> Values<'_> {
        Values {
            decoder: self,
            failed: false,
        }
    }

    /// Mark the end of the stream. A trailing bare number becomes complete
    /// and a dangling partial UTF-8 sequence is dropped.
    pub fn finish(&mut self) {
        self.finished = true;
        if !self.pending.is_empty() {
            debug!(bytes = self.pending.len(), "Dropping partial UTF-8 sequence");
            self.pending.clear();
        }
    }

    /// Drop whatever is left in the buffer, returning its length
    pub fn discard(&mut self) -> usize {
        let len = self.buf.len() + self.pending.len();
        self.consume(self.buf.len());
        self.pending.clear();
        len
    }

    /// Unconsumed bytes currently held
    pub fn buffered_len(&self) -> usize {
        self.buf.len() + self.pending.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn consume(&mut self, len: usize) {
        self.buf.drain(..len);
        self.consumed += len;
    }

    fn incomplete(&self) -> Result<Option<Value>> {
        if let Some(limit) = self.max_buffer {
            if self.buffered_len() > limit {
                return Err(ClientError::BufferOverflow { limit });
            }
        }
        Ok(None)
    }
}

/// Values already available in a [`StreamDecoder`]
pub struct Values<'a> {
    decoder: &'a mut StreamDecoder,
    failed: bool,
}

impl Iterator for Values<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.decoder.next_value() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
