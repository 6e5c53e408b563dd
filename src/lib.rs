//! # eventvisor
//!
//! **Eventvisor** is a lightweight server-push event streaming library
//! for Rust.
//!
//! One producer broadcasts named, identified text events to many
//! concurrently connected consumers. Consumers that arrive late or
//! reconnect catch up from a bounded replay history, and slow or
//! broken consumers are isolated behind bounded per-subscriber
//! mailboxes so they can never stall the producer or each other.
//!
//! The wire format is the `text/event-stream` format of the WHATWG
//! Server-Sent Events standard, with a plain-text fallback variant for
//! consumers that did not negotiate it. Transport, negotiation, and
//! connection lifecycle stay outside this crate: it speaks to the
//! world through `AsyncWrite`/`AsyncRead` and the [`Sink`] trait.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  producer ──► Group ──► [command queue] ──► coordinator task
//!                                               ├─ history (bounded FIFO, replay)
//!                                               └─ fan-out to subscriber set
//!                                                      │
//!                       ┌──────────────────────────────┼─────────────────┐
//!                       ▼                              ▼                 ▼
//!                 BufferedSink                   BufferedSink        PlainSink
//!                 (mailbox+worker)               (mailbox+worker)        │
//!                       ▼                              ▼                 ▼
//!                   EventSink                      EventSink         transport
//!                       ▼                              ▼
//!                   transport                      transport
//!
//!  consumer side:  transport ──► EventReader ──► Event
//! ```
//!
//! ### Delivery rules
//! - A broadcast visits every live subscriber; a failing subscriber is
//!   shed, never retried, and only the first error is reported.
//! - A subscriber behind a full mailbox is shed rather than awaited
//!   (capacity 0 opts into full backpressure instead).
//! - A subscribe either sees an event in its history replay or
//!   receives it live, never both and never neither: all group
//!   operations are serialized through one coordinator task.
//!
//! ## Features
//! | Area            | Description                                          | Key types                       |
//! |-----------------|------------------------------------------------------|---------------------------------|
//! | **Broadcast**   | Fan-out with replay history and shedding.            | [`Group`], [`GroupConfig`]      |
//! | **Sinks**       | Rich / plain wire variants over any `AsyncWrite`.    | [`EventSink`], [`PlainSink`]    |
//! | **Backpressure**| Bounded mailbox + delivery worker per subscriber.    | [`BufferedSink`]                |
//! | **Decoding**    | Incremental parser with reconnection metadata.       | [`EventReader`]                 |
//! | **Errors**      | Typed sink and group errors with stable labels.      | [`SinkError`], [`GroupError`]   |
//!
//! ## Example
//! ```rust
//! use eventvisor::{BufferedSink, Event, EventReader, EventSink, Group, GroupConfig};
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let group = Group::new(GroupConfig {
//!         history_limit: 32,
//!         retry: Duration::from_secs(2),
//!         ..GroupConfig::default()
//!     });
//!
//!     // One consumer, isolated behind a mailbox of 16 events.
//!     let (server, client) = tokio::io::duplex(4096);
//!     let sink = BufferedSink::new(EventSink::new(server), 16, Duration::ZERO);
//!     let subscription = group.subscribe(sink, "").await?;
//!
//!     group.send(Event::message("tick").with_id("1").with_kind("clock")).await?;
//!
//!     let mut reader = EventReader::new(client);
//!     let event = reader.next_event().await?.expect("one event");
//!     assert_eq!(event.kind, "clock");
//!     assert_eq!(reader.last_event_id(), "1");
//!     assert_eq!(reader.retry_time(), Some(Duration::from_secs(2)));
//!
//!     subscription.unsubscribe().await;
//!     group.close().await;
//!     Ok(())
//! }
//! ```

mod config;
mod decode;
mod error;
mod events;
mod group;
mod sinks;

// ---- Public re-exports ----

pub use config::GroupConfig;
pub use decode::EventReader;
pub use error::{GroupError, SinkError};
pub use events::Event;
pub use group::{Group, Subscription};
pub use sinks::{BufferedSink, EventSink, PlainSink, Sink};

/// MIME type of the plain wire variant, for Content-Type and Accept
/// headers in the negotiation layer.
pub const MIME_TYPE_PLAIN: &str = "text/plain";

/// MIME type of the rich event-stream wire variant.
pub const MIME_TYPE_SSE: &str = "text/event-stream";
