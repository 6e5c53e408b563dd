//! # Plain wire variant.
//!
//! [`PlainSink`] sends only the payload of each event, separated by
//! blank lines. Ids, type tags, and retry advice are not expressible
//! in this variant: an event with empty data writes nothing, and
//! `set_retry_time` is a no-op.
//!
//! Consumers that did not negotiate the rich format get this variant;
//! the selection happens outside this crate.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::SinkError;
use crate::events::Event;
use crate::sinks::Sink;

/// Sink sending events as bare text payloads.
pub struct PlainSink<W> {
    writer: W,
}

impl<W> PlainSink<W> {
    /// Wraps the given transport.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying transport.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> Sink for PlainSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&mut self, event: &Event) -> Result<(), SinkError> {
        // Nothing to say for a value-less event in this variant.
        if event.data.is_empty() {
            return Ok(());
        }

        self.writer.write_all(event.data.as_bytes()).await?;
        self.writer.write_all(b"\n\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn set_retry_time(&mut self, _retry: Duration) -> Result<(), SinkError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_payload_only() {
        let (server, mut client) = tokio::io::duplex(256);
        let mut sink = PlainSink::new(server);

        sink.send(&Event::message("first").with_id("9").with_kind("tick"))
            .await
            .unwrap();
        sink.send(&Event::message("")).await.unwrap();
        sink.send(&Event::message("second")).await.unwrap();
        sink.close().await.unwrap();
        drop(sink);

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "first\n\nsecond\n\n");
    }

    #[tokio::test]
    async fn test_retry_is_noop() {
        let (server, mut client) = tokio::io::duplex(256);
        let mut sink = PlainSink::new(server);

        sink.set_retry_time(Duration::from_secs(5)).await.unwrap();
        sink.close().await.unwrap();
        drop(sink);

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        assert!(out.is_empty());
    }
}
