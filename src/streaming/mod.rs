use std::ops::Range;

pub mod brace;
pub mod buffer;
pub mod decoder;
pub mod event;
pub mod line;
pub mod stream;

pub use buffer::ByteBuffer;
pub use decoder::{FramingMode, StreamingEventDecoder};
pub use event::ParsedEvent;
pub use stream::{DecodedStream, decode_events};

/// Result of one framing pass over the buffer
#[derive(Debug, Default)]
pub struct Extraction {
    /// Frame payload spans, in the order their closing delimiter was seen
    pub frames: Vec<Range<usize>>,
    /// Leading bytes the buffer can drop
    pub consumed: usize,
    /// Non-empty lines that carried no frame
    pub ignored_lines: usize,
}
