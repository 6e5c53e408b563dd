//! Tail demo: decode an event stream from stdin and print each event.
//!
//! Try it with:
//! ```text
//! printf 'data: hello\nid: 1\n\nretry: 5000\ndata: world\n\n' | cargo run --example tail
//! ```

use eventvisor::EventReader;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = EventReader::new(tokio::io::stdin());

    while let Some(event) = reader.next_event().await? {
        println!(
            "id={:?} kind={:?} data={:?}",
            event.id, event.kind, event.data
        );
    }

    println!(
        "stream ended; last id {:?}, retry advice {:?}",
        reader.last_event_id(),
        reader.retry_time()
    );
    Ok(())
}
