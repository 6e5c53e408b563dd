//! # Rich wire variant.
//!
//! [`EventSink`] encodes events in the `text/event-stream` format:
//! optional `id:` and `event:` lines, one `data:` line per payload
//! line, and a blank line terminating each record.
//!
//! ## Record shape
//! ```text
//! id:42
//! event:ticker
//! data:first line
//! data:second line
//! <blank>
//! ```
//!
//! Two encoding special cases carry protocol meaning:
//! - an id of a single space encodes as a bare `id` line, telling the
//!   client to forget its remembered last-event-id;
//! - empty data encodes as a bare `data` line, a value-less marker
//!   that still dispatches on the client.
//!
//! The transport is flushed after every record so consumers observe
//! events as they happen rather than when a buffer fills.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::SinkError;
use crate::events::Event;
use crate::sinks::Sink;

/// Sink encoding events in the rich `text/event-stream` format.
pub struct EventSink<W> {
    writer: W,
}

impl<W> EventSink<W> {
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
impl<W> Sink for EventSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&mut self, event: &Event) -> Result<(), SinkError> {
        let record = encode_record(event);
        self.writer.write_all(record.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn set_retry_time(&mut self, retry: Duration) -> Result<(), SinkError> {
        let record = encode_retry(retry);
        self.writer.write_all(record.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// Encodes one event as a complete wire record, blank line included.
fn encode_record(event: &Event) -> String {
    let mut out = String::with_capacity(event.data.len() + 32);

    if event.id == " " {
        // Single-space sentinel: reset the client's remembered id.
        out.push_str("id\n");
    } else if !event.id.is_empty() {
        out.push_str("id:");
        out.push_str(&event.id);
        out.push('\n');
    }

    if !event.kind.is_empty() {
        out.push_str("event:");
        out.push_str(&event.kind);
        out.push('\n');
    }

    if event.data.is_empty() {
        // Value-less marker; still dispatches on the client.
        out.push_str("data");
    } else {
        out.push_str("data:");
        push_data(&mut out, &event.data);
    }

    out.push_str("\n\n");
    out
}

/// Appends payload text, turning every line break into a fresh `data:`
/// continuation so multi-line payloads survive the line-oriented frame.
fn push_data(out: &mut String, data: &str) {
    let mut rest = data;
    while let Some(pos) = rest.find(['\r', '\n']) {
        out.push_str(&rest[..pos]);
        out.push_str("\ndata:");
        // CRLF counts as one break.
        let sep = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + sep..];
    }
    out.push_str(rest);
}

fn encode_retry(retry: Duration) -> String {
    format!("retry:{}\n\n", retry.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_only() {
        let record = encode_record(&Event::message("one"));
        assert_eq!(record, "data:one\n\n");
    }

    #[test]
    fn test_id_and_data() {
        let record = encode_record(&Event::message("two").with_id("id2"));
        assert_eq!(record, "id:id2\ndata:two\n\n");
    }

    #[test]
    fn test_id_kind_and_data() {
        let record = encode_record(&Event::message("three").with_id("id3").with_kind("typeThree"));
        assert_eq!(record, "id:id3\nevent:typeThree\ndata:three\n\n");
    }

    #[test]
    fn test_reset_sentinel_and_multiline_data() {
        let record = encode_record(&Event::message("line1\rline2\nline3\r\nline4").with_id(" "));
        assert_eq!(
            record,
            "id\ndata:line1\ndata:line2\ndata:line3\ndata:line4\n\n"
        );
    }

    #[test]
    fn test_empty_data_marker() {
        let record = encode_record(&Event::message(""));
        assert_eq!(record, "data\n\n");
    }

    #[test]
    fn test_trailing_newline_becomes_empty_continuation() {
        let record = encode_record(&Event::message("x\n"));
        assert_eq!(record, "data:x\ndata:\n\n");
    }

    #[test]
    fn test_retry_record() {
        assert_eq!(encode_retry(Duration::from_secs(10)), "retry:10000\n\n");
    }

    #[tokio::test]
    async fn test_send_writes_and_flushes() {
        let (server, mut client) = tokio::io::duplex(256);
        let mut sink = EventSink::new(server);

        sink.send(&Event::message("hello").with_id("1"))
            .await
            .unwrap();

        let expected = b"id:1\ndata:hello\n\n";
        let mut buf = vec![0u8; expected.len()];
        tokio::io::AsyncReadExt::read_exact(&mut client, &mut buf)
            .await
            .unwrap();
        assert_eq!(buf, expected);
    }

    #[tokio::test]
    async fn test_send_after_peer_gone_errors() {
        let (server, client) = tokio::io::duplex(16);
        drop(client);
        let mut sink = EventSink::new(server);

        let err = sink.send(&Event::message("x")).await.unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
    }
}
