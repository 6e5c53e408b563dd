//! # Stream decoder.
//!
//! [`EventReader`] is the consuming side of the protocol: it pulls
//! bytes from a transport and incrementally parses them back into
//! [`Event`]s, following the event-stream interpretation rules of the
//! WHATWG Server-Sent Events standard (§9.2.5).
//!
//! ## Parsing model
//! The stream is split into logical lines at CRLF, CR, or LF. Each
//! line either dispatches the accumulated event (blank line), is a
//! comment (leading `:`), or carries a `field:value` pair:
//!
//! - `event`: pending type, last write wins
//! - `data`: appended to the pending payload, newline-joined
//! - `id`: the sticky id; survives dispatches until overwritten,
//!   ignored if the value embeds a NUL
//! - `retry`: reconnection advice, non-negative integer milliseconds
//! - anything else: ignored
//!
//! Malformed input is never fatal; only a transport read error is.
//! An event still accumulating when the stream ends is discarded.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::events::Event;

/// Pull-based decoder turning a byte stream back into events.
///
/// No internal concurrency: [`next_event`](EventReader::next_event)
/// awaits the underlying read and nothing else.
pub struct EventReader<R> {
    reader: R,
    buf: Vec<u8>,
    eof: bool,
    /// The previous line ended at a CR sitting on the buffer edge; an
    /// LF arriving with the next read belongs to that terminator.
    skip_lf: bool,

    id_buf: String,
    type_buf: String,
    data_buf: String,

    last_event_id: String,
    retry_time: Option<Duration>,
}

impl<R> EventReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Wraps the given transport.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            eof: false,
            skip_lf: false,
            id_buf: String::new(),
            type_buf: String::new(),
            data_buf: String::new(),
            last_event_id: String::new(),
            retry_time: None,
        }
    }

    /// The id of the most recently dispatched block.
    ///
    /// Updated on every dispatch, including blocks that produce no
    /// event. A reconnecting client hands this back as the
    /// `last_event_id` argument of
    /// [`Group::subscribe`](crate::Group::subscribe).
    pub fn last_event_id(&self) -> &str {
        &self.last_event_id
    }

    /// The most recent reconnection delay advice, if any was seen.
    pub fn retry_time(&self) -> Option<Duration> {
        self.retry_time
    }

    /// Reads until the next event dispatches or the stream ends.
    ///
    /// Returns `Ok(None)` at end of stream; anything accumulated but
    /// not yet dispatched is discarded. Read errors are returned
    /// verbatim and the decoder does not retry.
    pub async fn next_event(&mut self) -> io::Result<Option<Event>> {
        while let Some(raw) = self.next_line().await? {
            let line = String::from_utf8_lossy(&raw);

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    return Ok(Some(event));
                }
                continue;
            }

            if line.starts_with(':') {
                continue;
            }

            match line.split_once(':') {
                Some((field, value)) => {
                    // One leading space in the value is part of the
                    // frame, not the payload.
                    let value = value.strip_prefix(' ').unwrap_or(value);
                    self.process(field, value);
                }
                None => self.process(&line, ""),
            }
        }

        Ok(None)
    }

    fn process(&mut self, field: &str, value: &str) {
        match field {
            "event" => {
                self.type_buf.clear();
                self.type_buf.push_str(value);
            }
            "data" => {
                self.data_buf.push_str(value);
                self.data_buf.push('\n');
            }
            "id" => {
                // An id with an embedded NUL is malformed; keep the
                // previous one.
                if !value.contains('\0') {
                    self.id_buf.clear();
                    self.id_buf.push_str(value);
                }
            }
            "retry" => {
                if let Ok(millis) = value.parse::<u64>() {
                    self.retry_time = Some(Duration::from_millis(millis));
                }
            }
            _ => {}
        }
    }

    /// Ends the current block: publishes the sticky id and produces an
    /// event if any data accumulated.
    fn dispatch(&mut self) -> Option<Event> {
        // The id buffer is sticky; it is published on every dispatch
        // and only ever changed by a later `id` field.
        self.last_event_id.clone_from(&self.id_buf);

        if self.data_buf.is_empty() {
            self.type_buf.clear();
            return None;
        }

        let mut data = std::mem::take(&mut self.data_buf);
        // Strip the separator the last data line appended.
        if data.ends_with('\n') {
            data.pop();
        }

        let kind = if self.type_buf.is_empty() {
            "message".to_string()
        } else {
            std::mem::take(&mut self.type_buf)
        };

        Some(Event {
            id: self.last_event_id.clone(),
            kind,
            data,
        })
    }

    /// Returns the next logical line, or `None` at end of stream.
    ///
    /// Lines end at CRLF, CR, or LF. A final line without a terminator
    /// is still returned.
    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            if self.skip_lf {
                if let Some(&first) = self.buf.first() {
                    if first == b'\n' {
                        self.buf.drain(..1);
                    }
                    self.skip_lf = false;
                } else if self.eof {
                    self.skip_lf = false;
                } else {
                    self.fill().await?;
                    continue;
                }
            }

            if let Some(pos) = self.buf.iter().position(|&b| b == b'\r' || b == b'\n') {
                let sep = self.buf[pos];
                let line = self.buf[..pos].to_vec();

                if sep == b'\r' {
                    if pos + 1 < self.buf.len() {
                        let consumed = if self.buf[pos + 1] == b'\n' {
                            pos + 2
                        } else {
                            pos + 1
                        };
                        self.buf.drain(..consumed);
                    } else {
                        // CR on the buffer edge: the matching LF may
                        // arrive with the next read.
                        self.buf.drain(..=pos);
                        self.skip_lf = !self.eof;
                    }
                } else {
                    self.buf.drain(..=pos);
                }

                return Ok(Some(line));
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.buf)));
            }

            self.fill().await?;
        }
    }

    async fn fill(&mut self) -> io::Result<()> {
        let mut chunk = [0u8; 4096];
        let n = self.reader.read(&mut chunk).await?;
        if n == 0 {
            self.eof = true;
        } else {
            self.buf.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}
