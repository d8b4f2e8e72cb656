//! WebSocket endpoint using axum.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Caps concurrent WebSocket clients.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    pub fn try_acquire(&self) -> Option<ConnectionGuard<'_>> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(ConnectionGuard { limiter: self });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

pub struct ConnectionGuard<'a> {
    limiter: &'a ConnectionLimiter,
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
    }
}

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    broadcast_tx: broadcast::Sender<String>,
    connection_limiter: Arc<ConnectionLimiter>,
}

impl AppState {
    pub fn new(broadcast_tx: broadcast::Sender<String>, max_connections: usize) -> Self {
        Self {
            broadcast_tx,
            connection_limiter: Arc::new(ConnectionLimiter::new(max_connections)),
        }
    }
}

/// Create the axum router. The streaming endpoint is the root path.
pub fn create_router(state: AppState) -> Router {
    Router::new().route("/", get(ws_handler)).with_state(state)
}

/// WebSocket upgrade handler.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    if state.connection_limiter.try_acquire().is_none() {
        warn!(
            current = state.connection_limiter.current_count(),
            "WebSocket connection limit reached"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
    }
    // The guard taken above only gates the upgrade decision; the
    // connection task acquires its own slot for its lifetime
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Handle one client connection until it closes or its write fails.
async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let _guard = match state.connection_limiter.try_acquire() {
        Some(guard) => guard,
        None => {
            warn!("Connection limit reached during upgrade");
            return;
        }
    };

    info!(
        connections = state.connection_limiter.current_count(),
        "Display client connected"
    );

    let (mut sender, mut receiver) = socket.split();

    // No backlog: the client observes only messages published after this
    // subscription was taken
    let mut broadcast_rx = state.broadcast_tx.subscribe();

    // Watches the incoming side for close frames and transport errors
    let mut incoming_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            // Only this client is removed; the broadcast
                            // channel keeps serving the others
                            debug!("Write failed, removing client");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "Client lagged, skipping to latest");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }
            _ = &mut incoming_task => {
                break;
            }
        }
    }

    info!(
        connections = state.connection_limiter.current_count().saturating_sub(1),
        "Display client disconnected"
    );
}

/// Bind and serve the distribution endpoint.
pub async fn run_server(
    config: ServerConfig,
    broadcast_tx: broadcast::Sender<String>,
) -> ServerResult<()> {
    let state = AppState::new(broadcast_tx, config.max_connections);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| {
            ServerError::Bind {
                addr: format!("{}:{}", config.host, config.port),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{e}")),
            }
        })?;
    info!(%addr, "Starting distribution server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
    axum::serve(listener, app).await?;

    Ok(())
}
