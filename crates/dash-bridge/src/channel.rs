//! The bridge channel.

use dash_core::{BusFrame, FrameRelay};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Default relay channel depth. At the 10 ms synthetic tick this buffers
/// a little over two seconds of frames.
pub const DEFAULT_BRIDGE_CAPACITY: usize = 256;

/// Create a frame bridge with the given channel depth.
pub fn frame_bridge(capacity: usize) -> (BridgeSender, BridgeReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    let sender = BridgeSender {
        tx,
        dropped: Arc::new(AtomicU64::new(0)),
    };
    (sender, BridgeReceiver { rx })
}

/// Sending half of the bridge, owned by the bus source.
///
/// Cloneable so a source implementation can hand it to its emission task.
#[derive(Clone)]
pub struct BridgeSender {
    tx: mpsc::Sender<FrameRelay>,
    dropped: Arc<AtomicU64>,
}

impl BridgeSender {
    /// Relay one frame, fire and forget.
    ///
    /// Encodes the frame into its wire form and enqueues it without
    /// blocking. A full channel drops the frame with a warning; a closed
    /// channel (receiver torn down) drops it silently at debug level.
    /// No acknowledgement or backpressure reaches the caller.
    pub fn relay(&self, frame: &BusFrame) {
        let msg = FrameRelay::from_frame(frame);
        match self.tx.try_send(msg) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(id = frame.id, total_dropped = total, "Bridge full, frame dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(id = frame.id, "Bridge receiver gone, frame dropped");
            }
        }
    }

    /// Number of frames dropped due to a full channel.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Receiving half of the bridge.
///
/// Consuming `self` in [`BridgeReceiver::run`] enforces the single
/// subscriber contract.
pub struct BridgeReceiver {
    rx: mpsc::Receiver<FrameRelay>,
}

impl BridgeReceiver {
    /// Receive the next relayed frame, `None` once all senders are gone.
    pub async fn recv(&mut self) -> Option<FrameRelay> {
        self.rx.recv().await
    }

    /// Drain the bridge, invoking `handler` once per relayed frame in
    /// emission order. Returns when every sender has been dropped.
    pub async fn run<F>(mut self, mut handler: F)
    where
        F: FnMut(FrameRelay),
    {
        while let Some(msg) = self.rx.recv().await {
            handler(msg);
        }
        debug!("Bridge drained, all senders dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_relay_preserves_emission_order() {
        let (tx, mut rx) = frame_bridge(16);
        for id in 0x400..0x404 {
            tx.relay(&BusFrame::new(id, vec![id as u8]));
        }
        drop(tx);

        let mut seen = Vec::new();
        while let Some(msg) = rx.recv().await {
            seen.push(msg.decode().unwrap().0);
        }
        assert_eq!(seen, vec![0x400, 0x401, 0x402, 0x403]);
    }

    #[tokio::test]
    async fn test_full_channel_drops_without_blocking() {
        let (tx, mut rx) = frame_bridge(2);
        for i in 0..5 {
            tx.relay(&BusFrame::new(0x100 + i, vec![]));
        }
        assert_eq!(tx.dropped(), 3);

        // The first two frames survive
        assert_eq!(rx.recv().await.unwrap().decode().unwrap().0, 0x100);
        assert_eq!(rx.recv().await.unwrap().decode().unwrap().0, 0x101);
    }

    #[tokio::test]
    async fn test_closed_receiver_is_not_an_error() {
        let (tx, rx) = frame_bridge(4);
        drop(rx);
        // Must not panic or block
        tx.relay(&BusFrame::new(0x1, vec![0xFF]));
        assert_eq!(tx.dropped(), 0);
    }

    #[tokio::test]
    async fn test_run_invokes_handler_per_frame() {
        let (tx, rx) = frame_bridge(16);
        tx.relay(&BusFrame::new(0x202, vec![0, 0, 1, 1, 0, 0]));
        tx.relay(&BusFrame::new(0x200, vec![1, 2, 3, 4, 5, 6, 7, 8]));
        drop(tx);

        let mut count = 0;
        rx.run(|msg| {
            assert!(msg.decode().is_ok());
            count += 1;
        })
        .await;
        assert_eq!(count, 2);
    }
}
