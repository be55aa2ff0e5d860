//! # streamframe
//!
//! Incremental decoder for chunked streaming HTTP responses.
//!
//! ## Overview
//!
//! Streaming backends deliver their results as a long-lived response body
//! split into arbitrary network reads. This library reassembles those reads
//! into complete frames and parses each one as JSON, in either of two
//! framings:
//! - **SSE style**: `data: <json>` lines separated by blank lines
//! - **Brace matching**: `{ ... }` objects embedded in free text, found by
//!   depth counting that skips braces inside string literals
//!
//! A malformed frame is logged and skipped; it never aborts the stream.
//!
//! ## Quick Start
//!
//! ```rust
//! use streamframe::{FramingMode, StreamingEventDecoder};
//!
//! let mut decoder = StreamingEventDecoder::new(FramingMode::Brace);
//! let mut events = decoder.feed(r#"noise{"a":1}moret"#);
//! events.extend(decoder.feed(r#"ext{"b":2}"#));
//! events.extend(decoder.finish());
//! assert_eq!(events.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`streaming`] - Buffer, framers, decoder and `Stream` adapter
//! - [`transport`] - Seam for opening a streaming response body
//! - [`client`] - reqwest implementation of the transport
//! - [`models`] - Typed events and reducers for the demo backends
//! - [`config`] - Configuration loading and validation
//! - [`metrics`] - Per-decoder counters
//! - [`error`] - Error types and handling

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod streaming;
pub mod transport;

pub use config::{DecoderConfig, StreamConfig};
pub use error::{Result, StreamError};
pub use metrics::DecodeStats;
pub use streaming::{DecodedStream, FramingMode, ParsedEvent, StreamingEventDecoder};
