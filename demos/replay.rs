//! Replay a recorded event stream into a session.
//!
//! Reads newline-delimited JSON events (optionally SSE `data:` lines) from
//! stdin, feeds them through the session's event queue and prints what a UI
//! would render.
//!
//! Run with:
//! ```bash
//! RUST_LOG=chatstate=debug cargo run --example replay < events.ndjson
//! ```

use chatstate::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let settings = StoreSettings::default();
    let mut session = Session::new(settings.clone())?;
    let (tx, rx) = Session::event_queue(&settings);

    // Reader task: parse lines and hand them to the single writer.
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut skipped = 0usize;
        while let Some(line) = lines.next_line().await? {
            match RawEvent::from_json_line(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unparseable line");
                    skipped += 1;
                }
            }
        }
        anyhow::Ok(skipped)
    });

    let read = session.run_queue(rx).await;
    let skipped = reader.await??;

    let state = session.state();
    println!("events: {read} read, {skipped} skipped, revision {}", state.revision());

    for conversation in state.active_conversations() {
        println!("\n== {} ({})", conversation.title, conversation.id);
        for message in state.messages(&conversation.id) {
            let text = state.live_text(&message.id).unwrap_or_default();
            println!("[{:?}/{:?}] {}", message.role, message.status, text);
            for call in &message.tool_calls {
                println!("    -> {}({})", call.name, call.arguments);
            }
        }
        for pending in state.pending_tool_calls(&conversation.id) {
            println!("    pending {} {:?}", pending.tool_name, pending.phase);
        }
        if state.is_streaming(&conversation.id) {
            println!("    (still streaming)");
        }
    }

    Ok(())
}
