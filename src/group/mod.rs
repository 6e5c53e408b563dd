//! # Broadcast groups: replayable fan-out to many subscribers.
//!
//! A [`Group`] takes events from a producer and delivers each one to
//! every live subscriber, keeping a bounded history so late or
//! reconnecting subscribers can catch up first.
//!
//! ## Architecture
//! ```text
//! producer ── send(event) ──► Group handle ──► [command queue]
//!                                                    │
//!                                         coordinator task (one per group)
//!                                           ├─ history (bounded FIFO)
//!                                           ├─ subscriber set
//!                                           └─ fan-out loop
//!                                                 ├──► sink 1
//!                                                 ├──► sink 2  ── error → shed
//!                                                 └──► sink N
//!
//! consumer ── subscribe(sink, last_event_id) ──► retry advice,
//!             history replay, then live events
//! ```
//!
//! ## Rules
//! - **Serialized mutation**: one coordinator task owns history and
//!   subscriber set; at most one operation is in flight at a time, so
//!   a subscribe racing a send sees the event exactly once (in replay
//!   or live, never both, never neither).
//! - **Attempt all, shed failures**: a broadcast visits every
//!   subscriber even after a failure; failing subscribers are removed
//!   and only the first error is returned.
//! - **Bounded producer latency**: wrap sinks whose writes can stall
//!   in a [`BufferedSink`](crate::BufferedSink) before subscribing, so
//!   fan-out pays mailbox-enqueue time, not network time.

mod actor;
mod handle;
mod history;

pub use handle::{Group, Subscription};
