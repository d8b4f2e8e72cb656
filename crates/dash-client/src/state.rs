//! Subscription state shared with the owning display surface.

use dash_core::TelemetrySnapshot;
use parking_lot::RwLock;
use std::sync::Arc;

/// Connection state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug)]
struct StateInner {
    state: ConnectionState,
    snapshot: Option<TelemetrySnapshot>,
    seq: u64,
}

/// Cloneable read handle over a subscription's published state.
///
/// Written only from the subscription's own run task; the display
/// surface reads it. Snapshots are replaced wholesale, never mutated in
/// place.
#[derive(Debug, Clone)]
pub struct SubscriptionState {
    inner: Arc<RwLock<StateInner>>,
}

impl SubscriptionState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StateInner {
                state: ConnectionState::Disconnected,
                snapshot: None,
                seq: 0,
            })),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.read().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// The most recently parsed snapshot, if any has ever arrived.
    pub fn snapshot(&self) -> Option<TelemetrySnapshot> {
        self.inner.read().snapshot.clone()
    }

    /// Number of snapshots accepted, for ordering diagnostics.
    pub fn seq(&self) -> u64 {
        self.inner.read().seq
    }

    /// Transition the connection state. The stored snapshot is never
    /// touched here: last-known-value is preserved across disconnects.
    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.inner.write().state = state;
    }

    /// Replace the stored snapshot wholesale.
    pub(crate) fn store_snapshot(&self, snapshot: TelemetrySnapshot) {
        let mut inner = self.inner.write();
        inner.snapshot = Some(snapshot);
        inner.seq += 1;
    }
}

impl Default for SubscriptionState {
    fn default() -> Self {
        Self::new()
    }
}
