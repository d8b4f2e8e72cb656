//! Hardware SocketCAN source (Linux only).
//!
//! Opens one named CAN channel and emits a frame per arrival with the
//! hardware-reported identifier and payload. Opening the channel fails
//! fast: the error is returned to the caller, who decides whether to
//! fall back to the synthetic source. Requires the interface to be up,
//! e.g. `ip link set can0 up type can bitrate 1000000`.

use crate::error::{BusError, BusResult};
use crate::BusSource;
use dash_bridge::BridgeSender;
use dash_core::BusFrame;
use socketcan::{CanSocket, EmbeddedFrame, Frame, Socket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Poll interval for the shutdown flag while the socket is idle.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Frame source backed by a SocketCAN channel.
pub struct HardwareSource {
    channel: String,
    socket: Option<CanSocket>,
    bridge: BridgeSender,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl HardwareSource {
    /// Open the named channel. Failure is returned, never swallowed.
    pub fn open(channel: &str, bridge: BridgeSender) -> BusResult<Self> {
        let socket = CanSocket::open(channel).map_err(|e| BusError::ChannelOpen {
            channel: channel.to_string(),
            source: e.into(),
        })?;
        socket.set_read_timeout(READ_TIMEOUT)?;
        Ok(Self {
            channel: channel.to_string(),
            socket: Some(socket),
            bridge,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        })
    }
}

impl BusSource for HardwareSource {
    fn start(&mut self) -> BusResult<()> {
        let socket = self.socket.take().ok_or(BusError::AlreadyStarted)?;
        self.running.store(true, Ordering::Release);
        info!(channel = %self.channel, "Hardware CAN source started");

        let bridge = self.bridge.clone();
        let running = self.running.clone();
        let channel = self.channel.clone();
        self.task = Some(tokio::task::spawn_blocking(move || {
            while running.load(Ordering::Acquire) {
                match socket.read_frame() {
                    Ok(frame) => {
                        let bus_frame = BusFrame::new(frame.raw_id(), frame.data().to_vec());
                        bridge.relay(&bus_frame);
                    }
                    Err(e)
                        if e.kind() == std::io::ErrorKind::WouldBlock
                            || e.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        // Idle bus; re-check the shutdown flag
                    }
                    Err(e) => {
                        warn!(channel = %channel, error = %e, "CAN read error");
                    }
                }
            }
            debug!(channel = %channel, "CAN read loop exited");
        }));
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(task) = self.task.take() {
            drop(task);
            info!(channel = %self.channel, "Hardware CAN source stopped");
        }
        // Releases the socket when stop is called before start
        self.socket = None;
    }
}

impl Drop for HardwareSource {
    fn drop(&mut self) {
        self.stop();
    }
}
