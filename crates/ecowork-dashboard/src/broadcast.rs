//! Event fan-out.
//!
//! The broadcaster bridges the application loop and the WebSocket clients:
//! it receives router events over an mpsc channel, serializes each once, and
//! publishes the JSON on the broadcast channel every connected client
//! subscribes to.

use ecowork_core::ClientEvent;
use ecowork_observability::Metrics;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, trace};

/// Run the broadcaster task.
///
/// Delivery is fire-and-forget: with no receivers the send result is
/// ignored, and a lagging client only ever skips its own messages. Returns
/// when the event channel closes.
pub async fn run_broadcaster(
    mut events: mpsc::Receiver<ClientEvent>,
    tx: broadcast::Sender<String>,
) {
    while let Some(event) = events.recv().await {
        let kind = event.kind();
        match event.to_json() {
            Ok(json) => {
                Metrics::event_broadcast(kind);
                match tx.send(json) {
                    Ok(receivers) => {
                        trace!(receivers, kind, "Event broadcast");
                    }
                    Err(_) => {
                        // No receivers - normal when no clients are connected
                        trace!(kind, "No WebSocket receivers connected");
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, kind, "Failed to serialize client event");
            }
        }
    }
    debug!("Event channel closed, broadcaster stopping");
}
