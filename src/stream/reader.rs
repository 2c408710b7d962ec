//! Pumps a byte source through the decoder

use serde_json::Value;
use tracing::{debug, info, trace};

use super::{ByteSource, Recv, StreamDecoder};
use crate::error::Result;

/// One step of a [`JsonStream`]
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A complete value was split off the stream
    Value(Value),
    /// The read timeout passed with no complete value available
    Idle,
    /// The peer closed the stream; any partial tail was dropped
    Closed,
}

/// Decoded JSON values from a [`ByteSource`], in arrival order
pub struct JsonStream<S> {
    source: S,
    decoder: StreamDecoder,
}

impl<S: ByteSource> JsonStream<S> {
    pub fn new(source: S) -> Self {
        Self::with_decoder(source, StreamDecoder::new())
    }

    pub fn with_decoder(source: S, decoder: StreamDecoder) -> Self {
        Self { source, decoder }
    }

    /// Wait for the next value, an idle tick, or the end of the stream.
    ///
    /// Values already buffered are returned without touching the source.
    pub async fn next_event(&mut self) -> Result<StreamEvent> {
        loop {
            if let Some(value) = self.decoder.next_value()? {
                return Ok(StreamEvent::Value(value));
            }

            if self.decoder.is_finished() {
                let dropped = self.decoder.discard();
                if dropped > 0 {
                    debug!(bytes = dropped, "Discarded incomplete trailing value");
                }
                return Ok(StreamEvent::Closed);
            }

            match self.source.recv().await? {
                Recv::Chunk(bytes) => self.decoder.extend(&bytes),
                Recv::Idle => {
                    trace!(buffered = self.decoder.buffered_len(), "No data within read timeout");
                    return Ok(StreamEvent::Idle);
                }
                Recv::Closed => {
                    info!("Stream closed by peer");
                    self.decoder.finish();
                }
            }
        }
    }

    /// Next value, waiting through idle ticks. `None` once the stream ends.
    pub async fn next_value(&mut self) -> Result<Option<Value>> {
        loop {
            match self.next_event().await? {
                StreamEvent::Value(value) => return Ok(Some(value)),
                StreamEvent::Idle => continue,
                StreamEvent::Closed => return Ok(None),
            }
        }
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;
    use std::collections::VecDeque;

    use crate::error::ClientError;

    /// Replays a fixed script of receive outcomes, then reports closed
    pub(crate) struct ScriptedSource {
        script: VecDeque<Recv>,
        pub(crate) recv_calls: usize,
    }

    impl ScriptedSource {
        pub(crate) fn new(script: impl IntoIterator<Item = Recv>) -> Self {
            Self {
                script: script.into_iter().collect(),
                recv_calls: 0,
            }
        }

        pub(crate) fn chunks(chunks: &[&str]) -> Self {
            Self::new(chunks.iter().map(|c| chunk(c)))
        }
    }

    pub(crate) fn chunk(text: &str) -> Recv {
        Recv::Chunk(Bytes::copy_from_slice(text.as_bytes()))
    }

    #[async_trait]
    impl ByteSource for ScriptedSource {
        async fn recv(&mut self) -> Result<Recv> {
            self.recv_calls += 1;
            Ok(self.script.pop_front().unwrap_or(Recv::Closed))
        }
    }

    async fn collect(source: ScriptedSource) -> Vec<Value> {
        let mut stream = JsonStream::new(source);
        let mut out = Vec::new();
        while let Some(value) = stream.next_value().await.unwrap() {
            out.push(value);
        }
        out
    }

    #[tokio::test]
    async fn test_idle_tick_does_not_change_output() {
        let plain = collect(ScriptedSource::chunks(&[r#"{"a":1}{"b""#, r#":2}"#])).await;
        let with_idle = collect(ScriptedSource::new([
            chunk(r#"{"a":1}{"b""#),
            Recv::Idle,
            Recv::Idle,
            chunk(r#":2}"#),
        ]))
        .await;

        assert_eq!(plain, vec![json!({"a": 1}), json!({"b": 2})]);
        assert_eq!(plain, with_idle);
    }

    #[tokio::test]
    async fn test_idle_is_surfaced_as_event() {
        let mut stream = JsonStream::new(ScriptedSource::new([Recv::Idle, chunk("[]")]));
        assert_eq!(stream.next_event().await.unwrap(), StreamEvent::Idle);
        assert_eq!(stream.next_event().await.unwrap(), StreamEvent::Value(json!([])));
        assert_eq!(stream.next_event().await.unwrap(), StreamEvent::Closed);
    }

    #[tokio::test]
    async fn test_close_drops_partial_tail() {
        let values = collect(ScriptedSource::chunks(&[
            r#"{"n":1} {"n":2}"#,
            r#"{"n":3}{"n":"#,
        ]))
        .await;
        assert_eq!(values, vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]);
    }

    #[tokio::test]
    async fn test_buffered_values_do_not_wait_on_source() {
        let mut stream = JsonStream::new(ScriptedSource::chunks(&["{}{}{}"]));
        for _ in 0..3 {
            assert_eq!(stream.next_value().await.unwrap(), Some(json!({})));
        }
        assert_eq!(stream.source_mut().recv_calls, 1);
    }

    #[tokio::test]
    async fn test_closed_is_sticky() {
        let mut stream = JsonStream::new(ScriptedSource::chunks(&["1"]));
        assert_eq!(stream.next_value().await.unwrap(), Some(json!(1)));
        assert_eq!(stream.next_event().await.unwrap(), StreamEvent::Closed);
        assert_eq!(stream.next_event().await.unwrap(), StreamEvent::Closed);
        assert_eq!(stream.source_mut().recv_calls, 2);
    }

    #[tokio::test]
    async fn test_malformed_stream_is_fatal() {
        let mut stream = JsonStream::new(ScriptedSource::chunks(&[r#"{"a":1} nope"#]));
        assert_eq!(stream.next_value().await.unwrap(), Some(json!({"a": 1})));
        assert!(matches!(
            stream.next_value().await,
            Err(ClientError::MalformedStream { .. })
        ));
    }
}
