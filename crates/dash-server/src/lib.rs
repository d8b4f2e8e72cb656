//! Telemetry distribution server.
//!
//! Consumes relayed bus frames from the bridge, folds them into the
//! current telemetry document, and re-publishes the assembled snapshot
//! to every connected display client over a WebSocket endpoint at `/`.
//! Delivery is at-most-once with no backlog: a client sees only messages
//! sent after it connected, and a write failure removes that client
//! without affecting the others.

pub mod assemble;
pub mod config;
pub mod decode;
pub mod error;
pub mod publish;
pub mod server;

pub use assemble::SnapshotAssembler;
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use publish::run_publisher;
pub use server::{run_server, AppState, ConnectionLimiter};
