//! Broadcast demo: one producer, two buffered consumers over
//! in-memory pipes.
//!
//! Run with: `cargo run --example broadcast`

use std::time::Duration;

use tokio::io::DuplexStream;

use eventvisor::{BufferedSink, Event, EventReader, EventSink, Group, GroupConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let group = Group::new(GroupConfig {
        history_limit: 8,
        retry: Duration::from_secs(2),
        ..GroupConfig::default()
    });

    let mut consumers = Vec::new();
    for name in ["alice", "bob"] {
        let (server, client) = tokio::io::duplex(4096);
        let sink = BufferedSink::new(EventSink::new(server), 16, Duration::from_secs(30));
        group.subscribe(sink, "").await?;
        consumers.push(tokio::spawn(consume(name, client)));
    }

    for n in 1..=5u32 {
        group
            .send(
                Event::message(format!("tick {n}"))
                    .with_id(n.to_string())
                    .with_kind("tick"),
            )
            .await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    // A late joiner resuming from id 3 only sees the tail.
    let (server, client) = tokio::io::duplex(4096);
    group.subscribe(EventSink::new(server), "3").await?;
    consumers.push(tokio::spawn(consume("carol", client)));

    group.send_message("goodbye").await?;
    group.close().await;

    for consumer in consumers {
        consumer.await?;
    }
    Ok(())
}

async fn consume(name: &str, client: DuplexStream) {
    let mut reader = EventReader::new(client);
    loop {
        match reader.next_event().await {
            Ok(Some(event)) => {
                println!(
                    "[{name}] id={:?} kind={:?} data={:?}",
                    event.id, event.kind, event.data
                );
            }
            Ok(None) => {
                println!("[{name}] stream ended (last id {:?})", reader.last_event_id());
                return;
            }
            Err(err) => {
                eprintln!("[{name}] read error: {err}");
                return;
            }
        }
    }
}
