//! # Broadcast group handle.
//!
//! [`Group`] is the producer-facing API: subscribe sinks, send events,
//! push retry advice, close. The handle is cheap to clone; every call
//! is forwarded as a command to the group's coordinator task, so all
//! operations on one group are serialized no matter how many handles
//! exist.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Event, EventReader, EventSink, Group, GroupConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let group = Group::new(GroupConfig {
//!         history_limit: 16,
//!         ..GroupConfig::default()
//!     });
//!
//!     let (server, client) = tokio::io::duplex(1024);
//!     let subscription = group.subscribe(EventSink::new(server), "").await?;
//!
//!     group.send(Event::message("hello").with_id("1")).await?;
//!
//!     let mut reader = EventReader::new(client);
//!     let event = reader.next_event().await?.expect("one event");
//!     assert_eq!(event.data, "hello");
//!
//!     subscription.unsubscribe().await;
//!     group.close().await;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::config::GroupConfig;
use crate::error::GroupError;
use crate::events::Event;
use crate::group::actor::{Command, GroupActor};
use crate::sinks::Sink;

/// Handle to a broadcast group.
///
/// Owns nothing itself; the coordinator task holds the history and
/// subscriber set. Dropping every handle without calling
/// [`Group::close`] stops the coordinator without closing subscriber
/// sinks; prefer an explicit close at shutdown.
#[derive(Clone)]
pub struct Group {
    tx: mpsc::Sender<Command>,
}

impl Group {
    /// Creates a group and spawns its coordinator task.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(config: GroupConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.command_capacity_clamped());
        let actor = GroupActor::new(&config);
        tokio::spawn(actor.run(rx));
        Self { tx }
    }

    /// Adds a sink to the group.
    ///
    /// If retry advice is configured it is sent first; then any
    /// retained history after `last_event_id` is replayed in order. An
    /// empty `last_event_id` replays everything retained; an id the
    /// history no longer knows also replays everything rather than
    /// risking a gap.
    ///
    /// The first replay failure aborts with the error and the sink is
    /// dropped, still unregistered. The caller should treat that as a
    /// failed connection: part of the replay may already have reached
    /// the client.
    ///
    /// On success the sink starts receiving live events and an
    /// [`Subscription`] is returned for removal.
    pub async fn subscribe(
        &self,
        sink: impl Sink,
        last_event_id: impl Into<String>,
    ) -> Result<Subscription, GroupError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::Subscribe {
                sink: Box::new(sink),
                last_event_id: last_event_id.into(),
                reply,
            })
            .await
            .map_err(|_| GroupError::Closed)?;

        let id = response.await.map_err(|_| GroupError::Closed)??;
        Ok(Subscription {
            id,
            tx: self.tx.clone(),
        })
    }

    /// Broadcasts an event to every current subscriber and records it
    /// in the replay history.
    ///
    /// All subscribers are attempted; any that fail are removed from
    /// the group and the first error is returned. `Ok(())` therefore
    /// means every subscriber that was healthy got the event.
    pub async fn send(&self, event: Event) -> Result<(), GroupError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::Send { event, reply })
            .await
            .map_err(|_| GroupError::Closed)?;
        response.await.map_err(|_| GroupError::Closed)??;
        Ok(())
    }

    /// Broadcasts a bare message event carrying only data.
    pub async fn send_message(&self, data: impl Into<String>) -> Result<(), GroupError> {
        self.send(Event::message(data)).await
    }

    /// Updates the group's retry advice and pushes it to every current
    /// subscriber, shedding any that fail, first error returned.
    ///
    /// New subscribers receive the updated advice on attach.
    pub async fn set_retry_time(&self, retry: Duration) -> Result<(), GroupError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::SetRetryTime { retry, reply })
            .await
            .map_err(|_| GroupError::Closed)?;
        response.await.map_err(|_| GroupError::Closed)??;
        Ok(())
    }

    /// Closes every subscriber sink, clears the history, and stops the
    /// coordinator. Idempotent; subsequent operations on any handle
    /// fail with [`GroupError::Closed`].
    pub async fn close(&self) {
        let (reply, response) = oneshot::channel();
        if self.tx.send(Command::Close { reply }).await.is_ok() {
            let _ = response.await;
        }
    }
}

/// Membership of one sink in a group.
///
/// Consuming [`unsubscribe`](Subscription::unsubscribe) removes the
/// sink from the group; it receives nothing afterwards. The connection
/// owner should call it exactly once when the consumer disconnects.
/// Dropping the subscription without unsubscribing leaves the sink in
/// the group until a delivery failure sheds it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    tx: mpsc::Sender<Command>,
}

impl Subscription {
    /// Removes the sink from the group. Removal is idempotent on the
    /// group side; a closed group means there is nothing to remove.
    pub async fn unsubscribe(self) {
        let _ = self.tx.send(Command::Unsubscribe { id: self.id }).await;
    }
}
