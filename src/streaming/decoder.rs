use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::brace::BraceScanner;
use super::buffer::ByteBuffer;
use super::event::ParsedEvent;
use super::line::{DEFAULT_PREFIX, LineFramer};
use super::Extraction;
use crate::config::DecoderConfig;
use crate::error::{Result, StreamError};
use crate::metrics::DecodeStats;

/// How frames are delimited in the incoming text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramingMode {
    /// `data: <json>` lines separated by blank lines
    #[default]
    Sse,
    /// Balanced `{ ... }` objects embedded in arbitrary text
    Brace,
}

impl FromStr for FramingMode {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sse" | "line" | "lines" => Ok(Self::Sse),
            "brace" | "json" => Ok(Self::Brace),
            other => Err(StreamError::ConfigError(format!(
                "Unknown framing mode '{}', expected 'sse' or 'brace'",
                other
            ))),
        }
    }
}

impl fmt::Display for FramingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sse => f.write_str("sse"),
            Self::Brace => f.write_str("brace"),
        }
    }
}

#[derive(Debug)]
enum Framer {
    Line(LineFramer),
    Brace(BraceScanner),
}

impl Framer {
    fn extract(&mut self, text: &str) -> Extraction {
        match self {
            Self::Line(framer) => framer.extract(text),
            Self::Brace(scanner) => scanner.extract(text),
        }
    }

    fn flush(&mut self, text: &str) -> Extraction {
        match self {
            Self::Line(framer) => framer.flush(text),
            // A still-open object can never complete
            Self::Brace(scanner) => scanner.extract(text),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Line(framer) => framer.reset(),
            Self::Brace(scanner) => scanner.reset(),
        }
    }
}

/// Incremental decoder for one streaming response.
///
/// Feed it text (or raw bytes) in whatever pieces the transport delivers;
/// it returns every complete frame parsed as JSON, in the order the
/// frames closed. Create one per stream and drop it when done.
///
/// ```
/// use streamframe::{FramingMode, StreamingEventDecoder};
///
/// let mut decoder = StreamingEventDecoder::new(FramingMode::Sse);
/// assert!(decoder.feed("data: {\"content\":\"Hel").is_empty());
/// let events = decoder.feed("lo\"}\n\n");
/// assert_eq!(events[0].str_field("content"), Some("Hello"));
/// ```
#[derive(Debug)]
pub struct StreamingEventDecoder {
    buffer: ByteBuffer,
    framer: Framer,
    mode: FramingMode,
    max_buffer_bytes: Option<usize>,
    stats: DecodeStats,
}

impl StreamingEventDecoder {
    pub fn new(mode: FramingMode) -> Self {
        let framer = match mode {
            FramingMode::Sse => Framer::Line(LineFramer::new(DEFAULT_PREFIX)),
            FramingMode::Brace => Framer::Brace(BraceScanner::new()),
        };

        Self {
            buffer: ByteBuffer::new(),
            framer,
            mode,
            max_buffer_bytes: None,
            stats: DecodeStats::new(),
        }
    }

    pub fn with_config(config: &DecoderConfig) -> Self {
        let mut decoder = Self::new(config.mode);
        if config.mode == FramingMode::Sse {
            decoder.framer = Framer::Line(LineFramer::new(config.prefix.clone()));
        }
        decoder.max_buffer_bytes = config.max_buffer_bytes;
        decoder
    }

    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    /// Append decoded text and return every frame it completes
    pub fn feed(&mut self, chunk: &str) -> Vec<ParsedEvent> {
        self.stats.record_chunk(chunk.len());
        let replaced = self.buffer.push_str(chunk);
        self.record_replaced(replaced);
        self.drain()
    }

    /// Append raw bytes, carrying a split UTF-8 sequence over to the next call.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD and counted; it never stops
    /// the rest of the chunk from being decoded.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Vec<ParsedEvent> {
        self.stats.record_chunk(chunk.len());
        let replaced = self.buffer.push_bytes(chunk);
        self.record_replaced(replaced);
        self.drain()
    }

    /// Signal end of stream and return any final frame.
    ///
    /// Whatever cannot be resolved into a frame is discarded.
    pub fn finish(self) -> Vec<ParsedEvent> {
        self.finish_with_stats().0
    }

    /// Like [`finish`](Self::finish), also returning the final counters
    pub fn finish_with_stats(mut self) -> (Vec<ParsedEvent>, DecodeStats) {
        let ex = self.framer.flush(self.buffer.as_str());
        let events = self.emit(ex);

        let residue = self.buffer.len() + self.buffer.pending_bytes();
        if residue > 0 {
            debug!(residue, mode = %self.mode, "Discarding unterminated residue at stream end");
            self.stats.residue_discarded += residue as u64;
        }

        (events, self.stats)
    }

    /// Drop buffered input and scan state, keeping counters
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.framer.reset();
    }

    /// Decoded bytes waiting for a frame to complete
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    fn record_replaced(&mut self, replaced: usize) {
        if replaced > 0 {
            warn!(replaced, "Replaced invalid UTF-8 in stream input");
            self.stats.invalid_utf8 += replaced as u64;
        }
    }

    fn drain(&mut self) -> Vec<ParsedEvent> {
        let ex = self.framer.extract(self.buffer.as_str());
        let events = self.emit(ex);

        if let Some(max) = self.max_buffer_bytes
            && self.buffer.len() > max
        {
            warn!(
                buffered = self.buffer.len(),
                max,
                "Buffer ceiling exceeded without a complete frame, discarding"
            );
            self.stats.buffer_overflows += 1;
            self.stats.residue_discarded += self.buffer.len() as u64;
            self.reset();
        }

        events
    }

    /// Parse the extracted frames and drop the consumed prefix
    fn emit(&mut self, ex: Extraction) -> Vec<ParsedEvent> {
        let mut events = Vec::with_capacity(ex.frames.len());
        let text = self.buffer.as_str();

        for range in ex.frames {
            let frame = &text[range];
            match ParsedEvent::parse(frame) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(error = %e, frame, "Skipping malformed frame");
                    self.stats.malformed_frames += 1;
                }
            }
        }

        self.stats.frames_emitted += events.len() as u64;
        self.stats.ignored_lines += ex.ignored_lines as u64;
        self.buffer.consume(ex.consumed);

        if !events.is_empty() {
            debug!(
                count = events.len(),
                buffered = self.buffer.len(),
                "Extracted frames"
            );
        }

        events
    }
}
