//! Error types used by sinks and broadcast groups.
//!
//! This module defines two error enums:
//!
//! - [`SinkError`] - failures delivering to a single subscriber sink.
//! - [`GroupError`] - failures of group-level operations.
//!
//! Both types provide an `as_label` helper returning a short stable
//! label for logs and metrics.
//!
//! Per-subscriber failures are local: a group operation sheds the
//! failing subscriber and keeps delivering to the rest, returning only
//! the first error it saw once every subscriber has been attempted.

use std::io;

use thiserror::Error;

/// Errors produced by a single subscriber sink.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SinkError {
    /// The sink's event buffer is full; the event was not accepted.
    ///
    /// Returned by a [`BufferedSink`](crate::BufferedSink) with a
    /// nonzero capacity when its mailbox is full. The group treats
    /// this like any write failure and drops the subscriber.
    #[error("event buffer full")]
    BufferFull,

    /// The sink no longer accepts events.
    ///
    /// Returned after `close`, or once a buffered sink's delivery
    /// worker has terminated (inner write failure or idle timeout).
    #[error("sink closed")]
    Closed,

    /// Writing to the underlying transport failed.
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

impl SinkError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::SinkError;
    ///
    /// assert_eq!(SinkError::BufferFull.as_label(), "sink_buffer_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SinkError::BufferFull => "sink_buffer_full",
            SinkError::Closed => "sink_closed",
            SinkError::Io(_) => "sink_io",
        }
    }
}

/// Errors produced by operations on a [`Group`](crate::Group).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GroupError {
    /// The group has been closed; nothing was attempted.
    #[error("group closed")]
    Closed,

    /// A subscriber sink failed during a group operation.
    ///
    /// Carries the first failure of the batch; the group attempted
    /// every subscriber and shed the failing ones before returning.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl GroupError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            GroupError::Closed => "group_closed",
            GroupError::Sink(err) => err.as_label(),
        }
    }
}
