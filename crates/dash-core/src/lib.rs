//! Core domain types for the vehicle dashboard telemetry relay.
//!
//! This crate provides the types shared across the pipeline:
//! - `BusFrame`: a single addressed frame from the instrumentation bus
//! - `FrameRelay`: the hex wire form a frame takes across the bridge
//! - `TelemetrySnapshot`: one decoded, timestamped telemetry document
//! - `derive`: pure mapping from a (possibly absent) snapshot to display
//!   values and the 12-leg shutdown-circuit health model

pub mod derive;
pub mod error;
pub mod frame;
pub mod snapshot;

pub use derive::{
    cell_temp, draw_gauge, pack_soc, segment_healthy, shutdown_legs, speed, ShutdownLegVector,
    SEGMENTS, SHUTDOWN_LEG_COUNT,
};
pub use error::{CoreError, Result};
pub use frame::{BusFrame, FrameRelay, MAX_FRAME_BYTES};
pub use snapshot::TelemetrySnapshot;
