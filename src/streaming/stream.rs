use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

use super::decoder::StreamingEventDecoder;
use super::event::ParsedEvent;
use crate::error::{Result, StreamError};
use crate::metrics::DecodeStats;

/// Wraps a byte stream (typically an HTTP response body) and yields
/// decoded events in arrival order.
///
/// Transport errors are passed through as they occur; the adapter never
/// retries. When the inner stream ends, the decoder is finished and any
/// final frame is yielded before the stream terminates.
pub struct DecodedStream<S> {
    inner: S,
    decoder: Option<StreamingEventDecoder>,
    pending: VecDeque<ParsedEvent>,
    final_stats: Option<DecodeStats>,
}

impl<S> DecodedStream<S> {
    pub fn new(inner: S, decoder: StreamingEventDecoder) -> Self {
        Self {
            inner,
            decoder: Some(decoder),
            pending: VecDeque::new(),
            final_stats: None,
        }
    }

    /// Current counters; final once the inner stream has ended
    pub fn stats(&self) -> DecodeStats {
        match (&self.decoder, &self.final_stats) {
            (Some(decoder), _) => decoder.stats().clone(),
            (None, Some(stats)) => stats.clone(),
            (None, None) => DecodeStats::default(),
        }
    }

    /// Whether the inner stream has ended
    pub fn is_finished(&self) -> bool {
        self.decoder.is_none()
    }
}

impl<S, E> Stream for DecodedStream<S>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: Into<StreamError>,
{
    type Item = Result<ParsedEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            let Some(decoder) = this.decoder.as_mut() else {
                return Poll::Ready(None);
            };

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.pending.extend(decoder.feed_bytes(&chunk)),
                Poll::Ready(Some(Err(e))) => {
                    let err: StreamError = e.into();
                    tracing::warn!(error = %err, "Transport failed mid-stream");
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    if let Some(decoder) = this.decoder.take() {
                        let (events, stats) = decoder.finish_with_stats();
                        tracing::debug!(%stats, "Stream ended");
                        this.final_stats = Some(stats);
                        this.pending.extend(events);
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Decode a byte stream with the given decoder
pub fn decode_events<S>(inner: S, decoder: StreamingEventDecoder) -> DecodedStream<S> {
    DecodedStream::new(inner, decoder)
}
