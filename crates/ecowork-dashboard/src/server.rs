//! HTTP server implementation using axum.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use ecowork_core::ClientEvent;
use ecowork_observability::Metrics;
use ecowork_relay::HubState;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use tokio::sync::{broadcast, mpsc};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::error::DashboardResult;
use crate::types::ApiSnapshot;

/// Connection limiter to prevent too many concurrent WebSocket connections.
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

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    hub_state: Arc<HubState>,
    broadcast_tx: broadcast::Sender<String>,
    connection_limiter: Arc<ConnectionLimiter>,
    config: DashboardConfig,
}

impl AppState {
    pub fn new(
        hub_state: Arc<HubState>,
        broadcast_tx: broadcast::Sender<String>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            hub_state,
            broadcast_tx,
            connection_limiter: Arc::new(ConnectionLimiter::new(config.max_connections)),
            config,
        }
    }
}

/// Create the axum router.
///
/// CORS stays permissive: the page may be served from anywhere on the local
/// network, matching the original deployment.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/snapshot", get(get_snapshot))
        .route("/ws", get(ws_handler))
        .route("/metrics", get(get_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the index HTML page.
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Get the current store contents as JSON.
async fn get_snapshot(State(state): State<AppState>) -> Json<ApiSnapshot> {
    Json(ApiSnapshot::from(state.hub_state.snapshot()))
}

/// Prometheus text exposition.
async fn get_metrics() -> Response {
    match Metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Metrics rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics unavailable").into_response()
        }
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    // Check the limit before upgrading so an overloaded hub refuses with 503
    // instead of accepting and immediately closing.
    let guard = match state.connection_limiter.try_acquire() {
        Some(guard) => guard,
        None => {
            warn!(
                current = state.connection_limiter.current_count(),
                max = state.config.max_connections,
                "WebSocket connection limit reached"
            );
            return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
        }
    };

    // The guard cannot move into the upgrade closure alongside the counted
    // re-acquire there; release it and count the connection inside the
    // handler task instead.
    drop(guard);

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Handle a WebSocket connection.
///
/// Clients receive every event broadcast after they connect, nothing
/// earlier. Inbound messages are ignored apart from close bookkeeping.
async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let _guard = match state.connection_limiter.try_acquire() {
        Some(guard) => guard,
        None => {
            warn!("Connection limit reached during upgrade");
            return;
        }
    };

    Metrics::client_connected();
    info!(
        connections = state.connection_limiter.current_count(),
        "New WebSocket connection"
    );

    let (mut sender, mut receiver) = socket.split();
    let mut broadcast_rx = state.broadcast_tx.subscribe();

    // Drain inbound frames so close and ping bookkeeping keep working.
    let mut incoming_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Forward broadcast messages to this client.
    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            debug!("Failed to send message, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "WebSocket client lagged, catching up");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }
            _ = &mut incoming_task => {
                debug!("Incoming task completed, closing connection");
                break;
            }
        }
    }

    incoming_task.abort();
    Metrics::client_disconnected();
    info!(
        connections = state.connection_limiter.current_count().saturating_sub(1),
        "WebSocket connection closed"
    );
}

/// Run the dashboard HTTP server.
///
/// Spawns the broadcaster for `events` and serves until the process exits.
pub async fn run_server(
    hub_state: Arc<HubState>,
    events: mpsc::Receiver<ClientEvent>,
    config: DashboardConfig,
) -> DashboardResult<()> {
    let (broadcast_tx, _) = broadcast::channel::<String>(config.broadcast_capacity);

    let state = AppState::new(hub_state, broadcast_tx.clone(), config.clone());
    let app = create_router(state);

    tokio::spawn(crate::broadcast::run_broadcaster(events, broadcast_tx));

    let addr = format!("{}:{}", config.host, config.port);
    info!(addr = %addr, "Starting dashboard server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_enforces_cap() {
        let limiter = ConnectionLimiter::new(2);

        let first = limiter.try_acquire().expect("first slot");
        let _second = limiter.try_acquire().expect("second slot");
        assert!(limiter.try_acquire().is_none());
        assert_eq!(limiter.current_count(), 2);

        drop(first);
        assert_eq!(limiter.current_count(), 1);
        assert!(limiter.try_acquire().is_some());
    }

    #[test]
    fn limiter_slots_are_reusable() {
        let limiter = ConnectionLimiter::new(1);
        for _ in 0..10 {
            let guard = limiter.try_acquire().expect("slot");
            drop(guard);
        }
        assert_eq!(limiter.current_count(), 0);
    }
}
