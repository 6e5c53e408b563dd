//! # Core sink trait
//!
//! `Sink` is the seam between a broadcast group and one outbound
//! connection. The transport layer picks a wire variant per connection
//! (content negotiation happens outside this crate) and hands the
//! group a boxed sink; the group only ever talks through this trait.
//!
//! ## Contract
//! - `send` must either deliver the whole record or return an error.
//!   A group treats any error as a dead subscriber and sheds it.
//! - `set_retry_time` pushes reconnection delay advice; variants that
//!   cannot express it return `Ok(())` and do nothing.
//! - `close` releases the underlying transport. Calling `send` after
//!   `close` is allowed to fail with [`SinkError::Closed`].
//!
//! Implementations that can block indefinitely on a slow consumer
//! should be wrapped in a [`BufferedSink`](crate::BufferedSink) before
//! being subscribed, so the group's fan-out latency stays bounded by
//! mailbox-enqueue time rather than network I/O.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::events::Event;

/// Contract for outbound event sinks.
///
/// Object safe: groups hold subscribers as `Box<dyn Sink>`.
#[async_trait]
pub trait Sink: Send + 'static {
    /// Delivers one event to the consumer.
    async fn send(&mut self, event: &Event) -> Result<(), SinkError>;

    /// Pushes reconnection delay advice to the consumer.
    ///
    /// A no-op returning `Ok(())` for variants that cannot express it.
    async fn set_retry_time(&mut self, retry: Duration) -> Result<(), SinkError>;

    /// Releases the underlying transport.
    ///
    /// The sink must not be used afterwards.
    async fn close(&mut self) -> Result<(), SinkError>;
}
