//! Display-side telemetry subscription.
//!
//! Each display surface owns one `Subscription`: a persistent WebSocket
//! connection to the distribution server with automatic reconnection and
//! bounded exponential backoff. The surface reads the latest snapshot
//! and a connectivity flag through a [`SubscriptionState`] handle.
//!
//! Disconnection policy: the stored snapshot is deliberately retained
//! across disconnects so the display keeps showing the last known
//! values; only the connectivity flag drops.

pub mod error;
pub mod state;
pub mod subscription;

pub use error::{ClientError, ClientResult};
pub use state::{ConnectionState, SubscriptionState};
pub use subscription::{Subscription, SubscriptionConfig};
