//! Subscription lifecycle.
//!
//! Handles the connection state machine, automatic reconnection with
//! bounded exponential backoff, and message handling. Parse failures
//! drop the offending message and keep the previous snapshot.

use crate::error::{ClientError, ClientResult};
use crate::state::{ConnectionState, SubscriptionState};
use dash_core::TelemetrySnapshot;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Subscription configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Distribution server URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    /// Base delay for exponential backoff.
    #[serde(default = "default_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    /// Maximum delay for exponential backoff.
    #[serde(default = "default_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
}

fn default_url() -> String {
    "ws://localhost:8001/".to_string()
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30000
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_reconnect_attempts: 0, // Infinite
            reconnect_base_delay_ms: default_base_delay_ms(),
            reconnect_max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// One persistent connection to the distribution server.
pub struct Subscription {
    config: SubscriptionConfig,
    state: SubscriptionState,
    shutdown_token: CancellationToken,
}

impl Subscription {
    pub fn new(config: SubscriptionConfig) -> Self {
        Self {
            config,
            state: SubscriptionState::new(),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Read handle for the owning display surface.
    pub fn state(&self) -> SubscriptionState {
        self.state.clone()
    }

    /// Tear the subscription down. Idempotent; after this no further
    /// state transitions occur regardless of in-flight messages.
    pub fn close(&self) {
        info!("Subscription close requested");
        self.shutdown_token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect and run until closed, reconnecting on transport failure.
    pub async fn run(&self) -> ClientResult<()> {
        let mut attempt = 0u32;

        loop {
            if self.is_closed() {
                self.state.set_state(ConnectionState::Disconnected);
                return Ok(());
            }

            self.state.set_state(ConnectionState::Connecting);

            match self.try_connect().await {
                Ok(()) => {
                    info!("Connection closed");
                }
                Err(e) => {
                    error!(error = %e, "Connection error");
                }
            }

            // The snapshot handle keeps its last value here; only the
            // connectivity flag drops
            self.state.set_state(ConnectionState::Disconnected);

            if self.is_closed() {
                return Ok(());
            }

            attempt += 1;
            if self.config.max_reconnect_attempts > 0
                && attempt >= self.config.max_reconnect_attempts
            {
                error!(attempt, "Max reconnection attempts reached");
                return Err(ClientError::ConnectionFailed(
                    "Max reconnection attempts reached".to_string(),
                ));
            }

            let delay = self.backoff_delay(attempt);
            warn!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    self.state.set_state(ConnectionState::Disconnected);
                    return Ok(());
                }
            }
        }
    }

    async fn try_connect(&self) -> ClientResult<()> {
        info!(url = %self.config.url, "Connecting to distribution server");

        let (ws_stream, _response) = connect_async(self.config.url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        self.state.set_state(ConnectionState::Connected);
        info!("Connected");

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        debug!(error = %e, "Failed to send close frame during teardown");
                    }
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            apply_message(&self.state, &text);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "Server closed connection");
                            return Err(ClientError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!("WebSocket stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.reconnect_base_delay_ms;
        let max = self.config.reconnect_max_delay_ms;

        // base * 2^(attempt-1), capped, plus jitter
        let exponent = attempt.saturating_sub(1).min(10);
        let delay = base.saturating_mul(1u64 << exponent).min(max);
        Duration::from_millis(delay + rand_jitter())
    }
}

/// Parse one wire message and update the subscription state.
///
/// A malformed payload is dropped with a log line and the previously
/// stored snapshot stays in place; nothing propagates to the owner.
fn apply_message(state: &SubscriptionState, text: &str) {
    match serde_json::from_str::<TelemetrySnapshot>(text) {
        Ok(snapshot) => {
            state.store_snapshot(snapshot);
        }
        Err(e) => {
            debug!(error = %e, "Dropping unparseable message");
        }
    }
}

/// Random jitter (0-500ms) from the clock's subsecond noise.
fn rand_jitter() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 500) as u64
}
