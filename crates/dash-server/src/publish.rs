//! Snapshot publication.
//!
//! The publisher is the bridge's single subscriber: it folds every
//! relayed frame into the assembler and, on a fixed cadence, serializes
//! the current snapshot once and hands it to the broadcast channel. All
//! connected WebSocket clients receive the same serialized document.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, trace};

use crate::assemble::SnapshotAssembler;
use dash_bridge::BridgeReceiver;

/// Run the publisher task until the acquisition side tears down.
pub async fn run_publisher(
    mut bridge: BridgeReceiver,
    tx: broadcast::Sender<String>,
    interval_ms: u64,
) {
    let mut assembler = SnapshotAssembler::new();
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));

    loop {
        tokio::select! {
            relay = bridge.recv() => {
                match relay {
                    Some(msg) => assembler.apply(&msg),
                    None => {
                        info!("Acquisition side closed, publisher stopping");
                        return;
                    }
                }
            }
            _ = interval.tick() => {
                let snapshot = assembler.snapshot();
                match serde_json::to_string(&snapshot) {
                    Ok(json) => {
                        // Serialized once; send errors just mean no
                        // clients are currently connected
                        match tx.send(json) {
                            Ok(n) => trace!(receivers = n, id = snapshot.id, "Snapshot published"),
                            Err(_) => trace!("No WebSocket receivers connected"),
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "Failed to serialize snapshot");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_bridge::frame_bridge;
    use dash_core::{BusFrame, FrameRelay, TelemetrySnapshot};

    #[tokio::test]
    async fn test_publisher_folds_and_broadcasts() {
        let (bridge_tx, bridge_rx) = frame_bridge(16);
        let (tx, mut rx) = broadcast::channel::<String>(16);

        let raw = 5000i16.to_le_bytes();
        bridge_tx.relay(&BusFrame::new(0x406, vec![raw[0], raw[1]]));

        let publisher = tokio::spawn(run_publisher(bridge_rx, tx, 5));

        // The first few publications may precede the frame; wait for one
        // that carries the decoded field
        let mut found = false;
        for _ in 0..20 {
            let json = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("publication within deadline")
                .expect("channel open");
            let snap: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
            if snap.number("dynamics", "flw_speed").is_some() {
                found = true;
                break;
            }
        }
        assert!(found, "published snapshot should carry the relayed field");

        drop(bridge_tx);
        publisher.await.unwrap();
    }

    #[tokio::test]
    async fn test_publisher_emits_empty_document_before_first_frame() {
        let (bridge_tx, bridge_rx) = frame_bridge(16);
        let (tx, mut rx) = broadcast::channel::<String>(16);
        let publisher = tokio::spawn(run_publisher(bridge_rx, tx, 5));

        let json = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("publication within deadline")
            .expect("channel open");
        let snap: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert!(snap.data.is_empty());
        assert_eq!(snap.id, 0);

        drop(bridge_tx);
        publisher.await.unwrap();
    }

    #[test]
    fn test_relay_shape_matches_bridge_payload() {
        // The publisher consumes exactly what the bridge emits
        let frame = BusFrame::new(0x200, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let relay = FrameRelay::from_frame(&frame);
        let mut assembler = SnapshotAssembler::new();
        assembler.apply(&relay);
        assert!(!assembler.snapshot().data.is_empty());
    }
}
