//! dashd - vehicle dashboard telemetry daemon.
//!
//! Wires the pipeline together: bus source -> frame bridge -> snapshot
//! assembly -> WebSocket distribution. The companion `dash-monitor`
//! binary is a headless display surface: it subscribes to the stream and
//! renders derived values as log lines, toggling between the dashboard
//! and shutdown-circuit views.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use logging::init_logging;
