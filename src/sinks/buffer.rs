//! # Buffered delivery with one worker per consumer.
//!
//! [`BufferedSink`] decorates a sink with a bounded mailbox and a
//! dedicated delivery worker, decoupling a slow consumer's write
//! latency from whoever is fanning events out.
//!
//! ## Architecture
//! ```text
//! send(event)
//!     │
//!     └──► [mailbox] ──► worker ──► inner.send()
//!          (bounded)        │
//!                           ├─ inner error ──► worker exits, inner closed
//!                           ├─ idle timeout ─► worker exits, inner closed
//!                           └─ close() ──────► worker exits, inner closed
//! ```
//!
//! ## Rules
//! - **Nonzero capacity**: `send` never blocks; a full mailbox returns
//!   [`SinkError::BufferFull`] immediately and the caller sheds this
//!   subscriber.
//! - **Zero capacity**: `send` waits until the worker has taken the
//!   previous item, giving full backpressure; a stalled consumer
//!   stalls its producer path.
//! - **Worker termination**: an inner write failure or an idle window
//!   with no traffic kills the worker; queued items are not drained
//!   after a failure. Subsequent `send` calls fail with
//!   [`SinkError::Closed`].
//! - Retry-time updates travel through the same mailbox as events, so
//!   the inner sink is only ever written from the worker and records
//!   stay ordered.
//!
//! The idle timeout is a dead-consumer detector: a consumer that has
//! received nothing for the whole window is assumed gone. It is not a
//! per-write deadline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::SinkError;
use crate::events::Event;
use crate::sinks::Sink;

/// Mailbox item. Everything written to the inner sink goes through
/// here so the worker is the only task touching it.
enum Item {
    Event(Arc<Event>),
    RetryTime(Duration),
}

/// Outcome of waiting for the next mailbox item.
enum Next {
    Item(Item),
    Idle,
    Closed,
}

/// Sink decorator pairing a bounded mailbox with one delivery worker.
pub struct BufferedSink {
    tx: Option<mpsc::Sender<Item>>,
    capacity: usize,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl BufferedSink {
    /// Wraps `inner` with a mailbox of the given capacity and spawns
    /// the delivery worker. Must be called within a Tokio runtime.
    ///
    /// - `capacity == 0`: full backpressure; `send` awaits the worker.
    /// - `capacity > 0`: non-blocking `send`; overflow is an error.
    /// - `idle_timeout == 0`: idle detection disabled.
    pub fn new(inner: impl Sink, capacity: usize, idle_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let idle = (idle_timeout > Duration::ZERO).then_some(idle_timeout);
        let worker = tokio::spawn(deliver(Box::new(inner), rx, idle, cancel.clone()));

        Self {
            tx: Some(tx),
            capacity,
            cancel,
            worker: Some(worker),
        }
    }

    async fn enqueue(&self, item: Item) -> Result<(), SinkError> {
        let Some(tx) = &self.tx else {
            return Err(SinkError::Closed);
        };

        if self.capacity == 0 {
            return tx.send(item).await.map_err(|_| SinkError::Closed);
        }

        match tx.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SinkError::BufferFull),
            Err(TrySendError::Closed(_)) => Err(SinkError::Closed),
        }
    }
}

#[async_trait]
impl Sink for BufferedSink {
    async fn send(&mut self, event: &Event) -> Result<(), SinkError> {
        self.enqueue(Item::Event(Arc::new(event.clone()))).await
    }

    async fn set_retry_time(&mut self, retry: Duration) -> Result<(), SinkError> {
        self.enqueue(Item::RetryTime(retry)).await
    }

    /// Stops accepting items, aborts any in-flight delivery, and waits
    /// for the worker, which closes the inner sink on its way out.
    /// Items still queued at this point are dropped, not flushed.
    async fn close(&mut self) -> Result<(), SinkError> {
        self.tx = None;
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
        Ok(())
    }
}

/// Delivery worker: forwards mailbox items to the inner sink until the
/// mailbox closes, the consumer goes silent, delivery fails, or the
/// owning sink is closed. The inner sink is closed on every exit path.
async fn deliver(
    mut sink: Box<dyn Sink>,
    mut rx: mpsc::Receiver<Item>,
    idle: Option<Duration>,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            next = next_item(&mut rx, idle) => next,
            _ = cancel.cancelled() => break,
        };

        let item = match next {
            Next::Item(item) => item,
            Next::Idle => {
                tracing::debug!("no traffic within idle window; dropping consumer");
                break;
            }
            Next::Closed => break,
        };

        let result = tokio::select! {
            result = forward(sink.as_mut(), &item) => result,
            _ = cancel.cancelled() => break,
        };

        if let Err(err) = result {
            tracing::debug!(error = %err, label = err.as_label(), "delivery failed; dropping consumer");
            break;
        }
    }

    if let Err(err) = sink.close().await {
        tracing::debug!(error = %err, "inner sink close failed");
    }
}

/// Waits for the next item, the idle deadline, or mailbox closure,
/// whichever comes first. Each received item rearms the idle window.
async fn next_item(rx: &mut mpsc::Receiver<Item>, idle: Option<Duration>) -> Next {
    let received = match idle {
        Some(window) => match time::timeout(window, rx.recv()).await {
            Ok(received) => received,
            Err(_elapsed) => return Next::Idle,
        },
        None => rx.recv().await,
    };

    match received {
        Some(item) => Next::Item(item),
        None => Next::Closed,
    }
}

async fn forward(sink: &mut dyn Sink, item: &Item) -> Result<(), SinkError> {
    match item {
        Item::Event(event) => sink.send(event).await,
        Item::RetryTime(retry) => sink.set_retry_time(*retry).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Semaphore;

    /// Inner sink for tests: signals when a delivery starts, waits for
    /// a permit before completing it, and reports completed deliveries.
    struct GatedSink {
        entered: mpsc::UnboundedSender<()>,
        gate: Arc<Semaphore>,
        delivered: mpsc::UnboundedSender<Event>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Sink for GatedSink {
        async fn send(&mut self, event: &Event) -> Result<(), SinkError> {
            let _ = self.entered.send(());
            let permit = self.gate.acquire().await.map_err(|_| SinkError::Closed)?;
            permit.forget();
            let _ = self.delivered.send(event.clone());
            Ok(())
        }

        async fn set_retry_time(&mut self, _retry: Duration) -> Result<(), SinkError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), SinkError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSink {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Sink for FailingSink {
        async fn send(&mut self, _event: &Event) -> Result<(), SinkError> {
            Err(SinkError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "peer gone",
            )))
        }

        async fn set_retry_time(&mut self, _retry: Duration) -> Result<(), SinkError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), SinkError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct TestRig {
        entered: mpsc::UnboundedReceiver<()>,
        gate: Arc<Semaphore>,
        delivered: mpsc::UnboundedReceiver<Event>,
        closed: Arc<AtomicBool>,
    }

    fn gated_sink() -> (GatedSink, TestRig) {
        let (entered_tx, entered_rx) = mpsc::unbounded_channel();
        let (delivered_tx, delivered_rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        let closed = Arc::new(AtomicBool::new(false));
        let sink = GatedSink {
            entered: entered_tx,
            gate: gate.clone(),
            delivered: delivered_tx,
            closed: closed.clone(),
        };
        let rig = TestRig {
            entered: entered_rx,
            gate,
            delivered: delivered_rx,
            closed,
        };
        (sink, rig)
    }

    fn ev(n: u32) -> Event {
        Event::message(format!("event {n}")).with_id(n.to_string())
    }

    #[tokio::test]
    async fn test_capacity_one_sheds_then_recovers() {
        let (sink, mut rig) = gated_sink();
        let mut buffered = BufferedSink::new(sink, 1, Duration::ZERO);

        // First event is taken by the worker, which stalls inside the
        // inner sink; the mailbox is empty again.
        buffered.send(&ev(1)).await.unwrap();
        rig.entered.recv().await.unwrap();

        // Second fills the single mailbox slot; third overflows.
        buffered.send(&ev(2)).await.unwrap();
        let err = buffered.send(&ev(3)).await.unwrap_err();
        assert!(matches!(err, SinkError::BufferFull));

        // Drain the first delivery; the slot frees up and a new event
        // is accepted again.
        rig.gate.add_permits(1);
        assert_eq!(rig.delivered.recv().await.unwrap(), ev(1));
        rig.entered.recv().await.unwrap();
        buffered.send(&ev(4)).await.unwrap();

        rig.gate.add_permits(2);
        assert_eq!(rig.delivered.recv().await.unwrap(), ev(2));
        assert_eq!(rig.delivered.recv().await.unwrap(), ev(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_zero_blocks_producer() {
        let (sink, mut rig) = gated_sink();
        let mut buffered = BufferedSink::new(sink, 0, Duration::ZERO);

        buffered.send(&ev(1)).await.unwrap();
        rig.entered.recv().await.unwrap();
        buffered.send(&ev(2)).await.unwrap();

        // Worker is stalled on event 1 and event 2 holds the slot:
        // the next send must wait.
        let third = ev(3);
        let send3 = buffered.send(&third);
        tokio::pin!(send3);
        tokio::select! {
            _ = &mut send3 => panic!("send completed while the worker was stalled"),
            _ = time::sleep(Duration::from_millis(50)) => {}
        }

        rig.gate.add_permits(3);
        send3.await.unwrap();

        assert_eq!(rig.delivered.recv().await.unwrap(), ev(1));
        assert_eq!(rig.delivered.recv().await.unwrap(), ev(2));
        assert_eq!(rig.delivered.recv().await.unwrap(), ev(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_kills_worker() {
        let (sink, rig) = gated_sink();
        let mut buffered = BufferedSink::new(sink, 4, Duration::from_secs(5));

        time::sleep(Duration::from_secs(6)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let err = buffered.send(&ev(1)).await.unwrap_err();
        assert!(matches!(err, SinkError::Closed));
        assert!(rig.closed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_rearms_idle_window() {
        let (sink, mut rig) = gated_sink();
        rig.gate.add_permits(64);
        let mut buffered = BufferedSink::new(sink, 4, Duration::from_secs(5));

        // Traffic at t=3s keeps the consumer alive past t=5s.
        time::sleep(Duration::from_secs(3)).await;
        buffered.send(&ev(1)).await.unwrap();
        assert_eq!(rig.delivered.recv().await.unwrap(), ev(1));

        time::sleep(Duration::from_secs(4)).await;
        buffered.send(&ev(2)).await.unwrap();
        assert_eq!(rig.delivered.recv().await.unwrap(), ev(2));

        // Silence for a full window now kills it.
        time::sleep(Duration::from_secs(6)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let err = buffered.send(&ev(3)).await.unwrap_err();
        assert!(matches!(err, SinkError::Closed));
    }

    #[tokio::test]
    async fn test_inner_failure_kills_worker() {
        let closed = Arc::new(AtomicBool::new(false));
        let mut buffered = BufferedSink::new(
            FailingSink {
                closed: closed.clone(),
            },
            4,
            Duration::ZERO,
        );

        buffered.send(&ev(1)).await.unwrap();
        // The worker hits the failure and exits; the mailbox closes.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let err = buffered.send(&ev(2)).await.unwrap_err();
        assert!(matches!(err, SinkError::Closed));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_close_closes_inner_and_rejects_sends() {
        let (sink, rig) = gated_sink();
        let mut buffered = BufferedSink::new(sink, 4, Duration::ZERO);

        buffered.close().await.unwrap();
        assert!(rig.closed.load(Ordering::SeqCst));

        let err = buffered.send(&ev(1)).await.unwrap_err();
        assert!(matches!(err, SinkError::Closed));

        // Close is idempotent.
        buffered.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_retry_updates_flow_through_mailbox() {
        let (server, mut client) = tokio::io::duplex(256);
        let mut buffered = BufferedSink::new(
            crate::sinks::EventSink::new(server),
            4,
            Duration::ZERO,
        );

        buffered.send(&ev(1)).await.unwrap();
        buffered.set_retry_time(Duration::from_secs(2)).await.unwrap();
        buffered.send(&ev(2)).await.unwrap();

        let expected = "id:1\ndata:event 1\n\nretry:2000\n\nid:2\ndata:event 2\n\n";
        let mut buf = vec![0u8; expected.len()];
        tokio::io::AsyncReadExt::read_exact(&mut client, &mut buf)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }
}
