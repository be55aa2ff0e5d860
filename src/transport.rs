use bytes::Bytes;
use futures::Stream;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

use crate::config::DecoderConfig;
use crate::error::Result;
use crate::streaming::{DecodedStream, StreamingEventDecoder};

/// Type alias for a streaming response body
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Type alias for the future returned by open_stream
pub type StreamFuture = Pin<Box<dyn Future<Output = Result<ByteStream>> + Send>>;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// URL-encoded form fields, in order
    Form(Vec<(String, String)>),
    Empty,
}

/// A POST to a streaming backend endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub path: String,
    pub body: RequestBody,
}

impl StreamRequest {
    pub fn json(path: impl Into<String>, body: Value) -> Self {
        Self {
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }

    pub fn form<K, V>(path: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            path: path.into(),
            body: RequestBody::Form(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: RequestBody::Empty,
        }
    }
}

/// Trait for anything that can open a streaming response body
pub trait Transport: Send + Sync {
    /// Send the request and return the response body as a byte stream
    ///
    /// # Returns
    /// The body stream of a successful response; a non-success status is an
    /// upstream error
    fn open_stream(&self, request: StreamRequest) -> StreamFuture;

    /// Get the transport name for logging
    fn name(&self) -> &str;
}

/// Open a stream and decode it with a fresh decoder built from `config`
pub async fn stream_events(
    transport: &dyn Transport,
    request: StreamRequest,
    config: &DecoderConfig,
) -> Result<DecodedStream<ByteStream>> {
    tracing::debug!(
        transport = transport.name(),
        path = %request.path,
        mode = %config.mode,
        "Opening event stream"
    );
    let body = transport.open_stream(request).await?;
    Ok(DecodedStream::new(
        body,
        StreamingEventDecoder::with_config(config),
    ))
}
