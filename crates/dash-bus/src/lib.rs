//! Frame acquisition from the vehicle instrumentation bus.
//!
//! Two source variants sit behind one polymorphic `{start, stop}`
//! interface: a hardware SocketCAN adapter (Linux only) and a synthetic
//! generator for headless development and testing. The variant is
//! selected once at startup by host capability probing and never
//! re-evaluated at runtime. Both emit identically shaped frames into the
//! bridge, so downstream components cannot distinguish the source.

pub mod error;
#[cfg(target_os = "linux")]
pub mod hardware;
pub mod synthetic;

pub use error::{BusError, BusResult};
#[cfg(target_os = "linux")]
pub use hardware::HardwareSource;
pub use synthetic::SyntheticSource;

use dash_bridge::BridgeSender;
use std::time::Duration;
use tracing::info;

/// A frame source with explicit start/stop lifecycle.
///
/// `start` begins frame production; `stop` halts it and releases the
/// underlying handle. `stop` is idempotent. Neither variant retries
/// frames: a missed frame is simply the absence of an emission.
pub trait BusSource: Send {
    fn start(&mut self) -> BusResult<()>;
    fn stop(&mut self);
}

/// Select a source by host capability, resolved once at initialization.
///
/// On Linux the hardware adapter is attempted first; if opening the
/// named channel fails the error is logged and the synthetic generator
/// is used instead. Elsewhere the synthetic generator is used directly.
pub fn select_source(
    channel: &str,
    synthetic_tick: Duration,
    bridge: BridgeSender,
) -> Box<dyn BusSource> {
    #[cfg(target_os = "linux")]
    {
        match HardwareSource::open(channel, bridge.clone()) {
            Ok(source) => {
                info!(channel, "Using hardware CAN source");
                return Box::new(source);
            }
            Err(e) => {
                tracing::warn!(channel, error = %e, "CAN channel unavailable, falling back to synthetic source");
            }
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = channel;
        info!("Host has no SocketCAN support, using synthetic source");
    }
    Box::new(SyntheticSource::new(synthetic_tick, bridge))
}
