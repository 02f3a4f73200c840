//! Newline-delimited frame codec.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────────────────────┬────┐
//! │ field1,field2,...,fieldN (ASCII)     │ \n │
//! └──────────────────────────────────────┴────┘
//! ```
//!
//! The codec accumulates incoming bytes into a buffer and yields
//! complete frames.  This handles partial reads gracefully: a single
//! transport delivery may carry part of a line, several lines, or both.
//! Frames are extracted lazily; anything the caller does not pull stays
//! buffered for the next [`LineDecoder::feed`] call.

use log::{debug, warn};

use super::telegram::{Telegram, TelegramSchema};
use crate::error::FrameError;

/// Upper bound for the configurable frame size (protects against memory
/// exhaustion from a stream that never sends a delimiter).
pub const MAX_FRAME_SIZE: usize = 4096;

/// Frame delimiter.
pub const DELIMITER: u8 = b'\n';

/// One delimited record, delimiter stripped, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame(Vec<u8>);

impl RawFrame {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Streaming line decoder.
pub struct LineDecoder {
    buf: Vec<u8>,
    /// Prefix of `buf` already searched for a delimiter.
    scanned: usize,
    limit: usize,
    /// Discarding bytes up to the next delimiter.
    skipping: bool,
}

impl LineDecoder {
    /// `limit` is clamped to `1..=MAX_FRAME_SIZE`.
    pub fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            limit: limit.clamp(1, MAX_FRAME_SIZE),
            skipping: false,
        }
    }

    /// Append `chunk` and iterate the frames it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Frames<'_> {
        self.push(chunk);
        Frames { decoder: self }
    }

    /// Drop all buffered bytes (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.scanned = 0;
        self.skipping = false;
    }

    /// Drop buffered bytes and skip to the next delimiter.  Used when bytes
    /// were lost upstream, so the next partial line cannot be trusted.
    pub fn resync(&mut self) {
        self.reset();
        self.skipping = true;
    }

    /// Bytes waiting for a delimiter.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    pub(crate) fn next_frame(&mut self) -> Option<Result<RawFrame, FrameError>> {
        loop {
            let Some(rel) = self.buf[self.scanned..]
                .iter()
                .position(|b| *b == DELIMITER)
            else {
                return self.check_remainder();
            };

            let end = self.scanned + rel;
            let line: Vec<u8> = self.buf.drain(..=end).collect();
            self.scanned = 0;

            if self.skipping {
                self.skipping = false;
                continue;
            }

            let body = &line[..line.len() - 1];
            if body.len() > self.limit {
                return Some(Err(FrameError::Oversized { limit: self.limit }));
            }
            return Some(Ok(RawFrame::from_bytes(body)));
        }
    }

    /// No delimiter in the buffer: enforce the size cap on the remainder.
    fn check_remainder(&mut self) -> Option<Result<RawFrame, FrameError>> {
        if self.skipping {
            self.buf.clear();
            self.scanned = 0;
            return None;
        }
        if self.buf.len() > self.limit {
            self.buf.clear();
            self.scanned = 0;
            self.skipping = true;
            return Some(Err(FrameError::Oversized { limit: self.limit }));
        }
        self.scanned = self.buf.len();
        None
    }
}

/// Lazy frame iterator returned by [`LineDecoder::feed`].
pub struct Frames<'a> {
    decoder: &'a mut LineDecoder,
}

impl Iterator for Frames<'_> {
    type Item = Result<RawFrame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_frame()
    }
}

// ── Telegram decoder ─────────────────────────────────────────

/// Line decoder plus schema: bytes in, validated telegrams out.
///
/// Malformed frames are logged, counted, and skipped; the stream never
/// ends because of corrupt input.
pub struct TelegramDecoder {
    lines: LineDecoder,
    schema: TelegramSchema,
    dropped: u64,
}

impl TelegramDecoder {
    pub fn new(schema: TelegramSchema, max_frame_bytes: usize) -> Self {
        Self {
            lines: LineDecoder::new(max_frame_bytes),
            schema,
            dropped: 0,
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Telegrams<'_> {
        self.lines.push(chunk);
        Telegrams { decoder: self }
    }

    pub fn schema(&self) -> TelegramSchema {
        self.schema
    }

    /// Switch schema.  Buffered bytes belong to the old shape and are dropped.
    pub fn set_schema(&mut self, schema: TelegramSchema) {
        self.schema = schema;
        self.lines.reset();
    }

    pub fn reset(&mut self) {
        self.lines.reset();
    }

    pub fn resync(&mut self) {
        self.lines.resync();
    }

    /// Malformed frames discarded since construction.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn buffered(&self) -> usize {
        self.lines.buffered()
    }
}

/// Lazy telegram iterator returned by [`TelegramDecoder::feed`].
pub struct Telegrams<'a> {
    decoder: &'a mut TelegramDecoder,
}

impl Iterator for Telegrams<'_> {
    type Item = Telegram;

    fn next(&mut self) -> Option<Telegram> {
        loop {
            let frame = match self.decoder.lines.next_frame()? {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Decoder: discarding frame: {}", e);
                    self.decoder.dropped += 1;
                    continue;
                }
            };

            match self.decoder.schema.parse(&frame) {
                Ok(telegram) => return Some(telegram),
                // Bare newlines are keep-alives, not corruption.
                Err(FrameError::Empty) => {}
                Err(e) => {
                    debug!(
                        "Decoder: malformed {:?} frame ({} bytes): {}",
                        self.decoder.schema,
                        frame.len(),
                        e
                    );
                    self.decoder.dropped += 1;
                }
            }
        }
    }
}
