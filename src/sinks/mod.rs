//! # Outbound event sinks.
//!
//! A sink is one consumer's side of the stream: the group fans an
//! event out by calling [`Sink::send`] on every subscriber. Two wire
//! variants exist, selected per connection by the transport layer
//! outside this crate, plus a buffering decorator that isolates the
//! group from slow consumers.
//!
//! ## Architecture
//! ```text
//! Group fan-out
//!     │
//!     ├──► BufferedSink ──► worker ──► EventSink ──► transport (rich)
//!     │    (bounded mailbox)
//!     └──► PlainSink ──► transport (plain)
//! ```
//!
//! - [`EventSink`]: the rich `text/event-stream` format with ids,
//!   types, multi-line payloads, and retry advice.
//! - [`PlainSink`]: bare payloads separated by blank lines.
//! - [`BufferedSink`]: wraps either variant with a bounded mailbox and
//!   a dedicated delivery worker; a full mailbox or a silent consumer
//!   sheds that subscriber instead of stalling the group.

mod buffer;
mod event;
mod plain;
mod sink;

pub use buffer::BufferedSink;
pub use event::EventSink;
pub use plain::PlainSink;
pub use sink::Sink;
