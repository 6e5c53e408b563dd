//! # Group coordinator.
//!
//! One task owns the whole of a group's mutable state: the replay
//! history, the subscriber set, and the default retry advice. Every
//! public operation on [`Group`](crate::Group) becomes a [`Command`]
//! on the coordinator's queue and is processed to completion before
//! the next one starts.
//!
//! That single-flight discipline is what makes replay sound: a
//! subscribe racing a send either sees the event in its history replay
//! or receives it live after registration, never both and never
//! neither.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::config::GroupConfig;
use crate::error::SinkError;
use crate::events::Event;
use crate::group::history::History;
use crate::sinks::Sink;

/// One queued group operation.
pub(crate) enum Command {
    Subscribe {
        sink: Box<dyn Sink>,
        last_event_id: String,
        reply: oneshot::Sender<Result<u64, SinkError>>,
    },
    Send {
        event: Event,
        reply: oneshot::Sender<Result<(), SinkError>>,
    },
    SetRetryTime {
        retry: Duration,
        reply: oneshot::Sender<Result<(), SinkError>>,
    },
    Unsubscribe {
        id: u64,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

struct Subscriber {
    id: u64,
    sink: Box<dyn Sink>,
}

/// Coordinator state. Runs on its own task; nothing else touches it.
pub(crate) struct GroupActor {
    history: History,
    subscribers: Vec<Subscriber>,
    retry: Duration,
    next_id: u64,
}

impl GroupActor {
    pub(crate) fn new(config: &GroupConfig) -> Self {
        Self {
            history: History::new(config.history_limit),
            subscribers: Vec::new(),
            retry: config.retry,
            next_id: 0,
        }
    }

    /// Drains commands until close. Replies outlive failures: a caller
    /// that went away mid-operation just loses its answer.
    pub(crate) async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Subscribe {
                    sink,
                    last_event_id,
                    reply,
                } => {
                    let _ = reply.send(self.subscribe(sink, &last_event_id).await);
                }
                Command::Send { event, reply } => {
                    let _ = reply.send(self.broadcast(event).await);
                }
                Command::SetRetryTime { retry, reply } => {
                    let _ = reply.send(self.set_retry_time(retry).await);
                }
                Command::Unsubscribe { id } => self.unsubscribe(id),
                Command::Close { reply } => {
                    self.close_all().await;
                    let _ = reply.send(());
                    // Commands still queued behind the close are
                    // dropped; their callers observe a closed group.
                    break;
                }
            }
        }
    }

    /// Sends retry advice, replays history, then registers the sink.
    ///
    /// The first failure aborts and leaves the sink unregistered; the
    /// sink is dropped, which releases its transport. Partial replay
    /// may already be visible to the client at that point.
    async fn subscribe(
        &mut self,
        mut sink: Box<dyn Sink>,
        last_event_id: &str,
    ) -> Result<u64, SinkError> {
        if self.retry > Duration::ZERO {
            sink.set_retry_time(self.retry).await?;
        }

        for event in self.history.since(last_event_id) {
            sink.send(event).await?;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, sink });
        tracing::debug!(subscriber = id, "attached");
        Ok(id)
    }

    /// Appends to history and delivers to every current subscriber.
    ///
    /// Every subscriber is attempted; failing ones are shed and the
    /// first error is returned once the sweep is done. One dead
    /// consumer never skips or delays delivery to the rest.
    async fn broadcast(&mut self, event: Event) -> Result<(), SinkError> {
        self.history.append(event.clone());

        let mut first_err = None;
        let mut shed = Vec::new();

        for sub in &mut self.subscribers {
            if let Err(err) = sub.sink.send(&event).await {
                tracing::debug!(
                    subscriber = sub.id,
                    error = %err,
                    label = err.as_label(),
                    "delivery failed; detaching"
                );
                shed.push(sub.id);
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }

        self.shed(&shed);
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Updates the default retry advice and pushes it to everyone,
    /// with the same attempt-all / shed-on-error policy as broadcast.
    async fn set_retry_time(&mut self, retry: Duration) -> Result<(), SinkError> {
        self.retry = retry;

        let mut first_err = None;
        let mut shed = Vec::new();

        for sub in &mut self.subscribers {
            if let Err(err) = sub.sink.set_retry_time(retry).await {
                tracing::debug!(
                    subscriber = sub.id,
                    error = %err,
                    label = err.as_label(),
                    "retry push failed; detaching"
                );
                shed.push(sub.id);
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }

        self.shed(&shed);
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn shed(&mut self, ids: &[u64]) {
        if !ids.is_empty() {
            self.subscribers.retain(|sub| !ids.contains(&sub.id));
        }
    }

    /// Removes a subscriber. Idempotent; unknown ids are ignored.
    fn unsubscribe(&mut self, id: u64) {
        let before = self.subscribers.len();
        self.subscribers.retain(|sub| sub.id != id);
        if self.subscribers.len() != before {
            tracing::debug!(subscriber = id, "detached");
        }
    }

    /// Closes every subscriber sink and clears all group state.
    async fn close_all(&mut self) {
        for sub in &mut self.subscribers {
            if let Err(err) = sub.sink.close().await {
                tracing::debug!(subscriber = sub.id, error = %err, "close failed");
            }
        }
        self.subscribers.clear();
        self.history.clear();
    }
}
