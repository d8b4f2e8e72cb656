//! Pipeline wiring.
//!
//! The acquisition loop (bus source feeding the bridge) and the
//! distribution loop (publisher plus WebSocket server) run as separate
//! tasks that share nothing but the typed bridge channel; the network
//! socket is the boundary to the display surfaces.

use crate::config::AppConfig;
use crate::error::AppResult;
use dash_bridge::{frame_bridge, BridgeReceiver};
use dash_bus::{select_source, BusSource};
use dash_server::{run_publisher, run_server};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Broadcast buffer depth; at the default 25 ms cadence this covers
/// roughly a second of publications for a lagging client.
const BROADCAST_CAPACITY: usize = 32;

/// The telemetry daemon.
pub struct Application {
    config: AppConfig,
    source: Box<dyn BusSource>,
    bridge_rx: BridgeReceiver,
}

impl Application {
    /// Build the pipeline: bridge, then capability-selected bus source.
    pub fn new(config: AppConfig) -> Self {
        let (bridge_tx, bridge_rx) = frame_bridge(config.server.bridge_capacity);
        let source = select_source(
            &config.bus.channel,
            Duration::from_millis(config.bus.synthetic_tick_ms),
            bridge_tx,
        );
        Self {
            config,
            source,
            bridge_rx,
        }
    }

    /// Run until interrupted.
    pub async fn run(mut self) -> AppResult<()> {
        self.source.start()?;

        let (broadcast_tx, _) = broadcast::channel::<String>(BROADCAST_CAPACITY);
        let publisher = tokio::spawn(run_publisher(
            self.bridge_rx,
            broadcast_tx.clone(),
            self.config.server.publish_interval_ms,
        ));

        let server = tokio::spawn(run_server(self.config.server.clone(), broadcast_tx));

        info!("Telemetry pipeline running");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down");
            }
            result = server => {
                match result {
                    Ok(Err(e)) => error!(error = %e, "Distribution server failed"),
                    Err(e) => error!(error = %e, "Distribution server panicked"),
                    Ok(Ok(())) => info!("Distribution server exited"),
                }
            }
        }

        // Stopping and dropping the source releases the last bridge
        // sender, which lets the publisher drain and exit on its own
        self.source.stop();
        drop(self.source);
        let _ = publisher.await;
        info!("Shutdown complete");
        Ok(())
    }
}
