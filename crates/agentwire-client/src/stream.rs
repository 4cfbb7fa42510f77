//! Pull-based event stream over a run response body.
//!
//! Chunks are read from the body only when the consumer asks for the next
//! event and no decoded event is waiting, so reading tracks consumption.
//! The body is owned by the stream: dropping the stream (or calling
//! [`EventStream::cancel`]) releases the connection on every exit path.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::decode::EventParser;
use crate::error::{BoxError, Error, Result};
use crate::types::AgentEvent;

/// Stream of events from one agent run.
///
/// Single consumer, single pass. After the first error the stream is
/// finished and yields `None`.
pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = Result<AgentEvent>> + Send>>,
    finished: bool,
}

impl EventStream {
    /// Wait for the next event.
    pub async fn next_event(&mut self) -> Option<Result<AgentEvent>> {
        self.next().await
    }

    /// Stop consuming and release the underlying connection.
    pub fn cancel(self) {
        if !self.finished {
            tracing::debug!("event stream cancelled by consumer");
        }
    }

    /// Whether the stream has ended, either normally or with an error.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drain the stream, stopping at the first error.
    pub async fn collect_events(mut self) -> Result<Vec<AgentEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event?);
        }
        Ok(events)
    }
}

impl Stream for EventStream {
    type Item = Result<AgentEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        let polled = self.inner.as_mut().poll_next(cx);
        match &polled {
            Poll::Ready(None) | Poll::Ready(Some(Err(_))) => self.finished = true,
            _ => {}
        }
        polled
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Decode a body byte stream into an [`EventStream`].
///
/// Any byte source works; the HTTP transport passes
/// `reqwest::Response::bytes_stream()`.
pub fn event_stream<S, E>(bytes: S) -> EventStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut bytes = Box::pin(bytes);
        let mut parser = EventParser::new();
        let mut ready: VecDeque<AgentEvent> = VecDeque::new();
        let mut delivered = 0usize;

        loop {
            while let Some(event) = ready.pop_front() {
                delivered += 1;
                tracing::trace!(event = %event.event, "stream event");
                yield Ok(event);
            }

            match bytes.next().await {
                Some(Ok(chunk)) => {
                    tracing::trace!(len = chunk.len(), "stream chunk");
                    if let Err(e) = parser.feed(&chunk, &mut ready) {
                        for event in ready.drain(..) {
                            delivered += 1;
                            yield Ok(event);
                        }
                        tracing::warn!(error = %e, delivered, "aborting stream on malformed event");
                        yield Err(e);
                        return;
                    }
                }
                Some(Err(e)) => {
                    let source: BoxError = e.into();
                    tracing::warn!(error = %source, delivered, "stream read failed");
                    yield Err(Error::Transport(source));
                    return;
                }
                None => break,
            }
        }

        let finished = parser.finish(&mut ready);
        for event in ready.drain(..) {
            delivered += 1;
            yield Ok(event);
        }
        if let Err(e) = finished {
            tracing::warn!(error = %e, delivered, "aborting stream on malformed event");
            yield Err(e);
            return;
        }
        tracing::debug!(delivered, "event stream complete");
    };

    EventStream {
        inner: Box::pin(stream),
        finished: false,
    }
}
