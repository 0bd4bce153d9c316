//! Dashboard server integration tests.
//!
//! Covers the WebSocket path over real sockets (connect, fan-out, the
//! no-catch-up rule, the connection limit) and the HTTP endpoints through
//! in-process requests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use ecowork_core::ClientEvent;
use ecowork_dashboard::{create_router, run_broadcaster, AppState, DashboardConfig};
use ecowork_observability::Metrics;
use ecowork_relay::{HubState, MessageRouter, TopicMap, DEFAULT_LUMINOSITY_THRESHOLD};
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite;
use tower::ServiceExt;

/// A store that already saw a presence and a telemetry message.
fn seeded_state() -> Arc<HubState> {
    let state = Arc::new(HubState::new());
    let router = MessageRouter::new(
        Arc::clone(&state),
        TopicMap::default(),
        DEFAULT_LUMINOSITY_THRESHOLD,
    );
    router.handle("ecowork/status", b"Presente");
    router.handle(
        "ecowork/telemetria",
        br#"{"temperatura": 22.0, "luminosidade": 1800}"#,
    );
    state
}

fn test_config(max_connections: usize) -> DashboardConfig {
    DashboardConfig {
        enabled: true,
        host: "127.0.0.1".to_owned(),
        port: 0,
        max_connections,
        broadcast_capacity: 16,
    }
}

/// Bind an ephemeral port, serve the dashboard on it, and return the bound
/// address plus the event channel feeding the broadcaster.
async fn spawn_server(
    state: Arc<HubState>,
    max_connections: usize,
) -> (SocketAddr, mpsc::Sender<ClientEvent>) {
    let config = test_config(max_connections);
    let (broadcast_tx, _) = broadcast::channel::<String>(config.broadcast_capacity);
    let (event_tx, event_rx) = mpsc::channel::<ClientEvent>(16);

    tokio::spawn(run_broadcaster(event_rx, broadcast_tx.clone()));

    let app = create_router(AppState::new(state, broadcast_tx, config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, event_tx)
}

async fn next_json_frame(
    ws: &mut (impl Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin),
) -> Value {
    let frame = timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("frame within deadline")
        .expect("stream still open")
        .expect("frame read ok");
    match frame {
        tungstenite::Message::Text(text) => {
            serde_json::from_str(&text).expect("frame is valid JSON")
        }
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn ws_client_receives_events_but_no_catchup() {
    let state = seeded_state();
    let (addr, event_tx) = spawn_server(state, 4).await;

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connects");

    // The store already holds data, yet nothing is replayed on connect.
    let quiet = timeout(Duration::from_millis(300), ws.next()).await;
    assert!(quiet.is_err(), "expected no catch-up frame on connect");

    event_tx
        .send(ClientEvent::StatusUpdated("Ausente".to_owned()))
        .await
        .expect("event accepted");

    let frame = next_json_frame(&mut ws).await;
    assert_eq!(frame["type"], "status_updated");
    assert_eq!(frame["value"], "Ausente");
}

#[tokio::test]
async fn ws_events_fan_out_to_every_client() {
    let state = seeded_state();
    let (addr, event_tx) = spawn_server(state, 4).await;

    let (mut first, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("first client connects");
    let (mut second, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("second client connects");
    // Give both connection tasks time to subscribe before broadcasting.
    tokio::time::sleep(Duration::from_millis(100)).await;

    event_tx
        .send(ClientEvent::AlertRaised("ALERTA: Presença detectada!".to_owned()))
        .await
        .expect("event accepted");

    for ws in [&mut first, &mut second] {
        let frame = next_json_frame(ws).await;
        assert_eq!(frame["type"], "alert_raised");
        assert_eq!(frame["value"], "ALERTA: Presença detectada!");
    }
}

#[tokio::test]
async fn ws_connections_beyond_limit_are_rejected() {
    let state = seeded_state();
    let (addr, _event_tx) = spawn_server(state, 1).await;

    let (_held, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("first client takes the only slot");
    // Let the connection task finish its slot bookkeeping.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let err = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect_err("second client is refused");
    match err {
        tungstenite::Error::Http(response) => {
            assert_eq!(response.status().as_u16(), 503);
        }
        other => panic!("expected HTTP rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn snapshot_endpoint_reports_store_contents() {
    let app = create_router(AppState::new(
        seeded_state(),
        broadcast::channel::<String>(16).0,
        test_config(4),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/snapshot")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collected");
    let value: Value = serde_json::from_slice(&body).expect("JSON body");

    assert!(value["timestamp_ms"].as_i64().is_some());
    assert_eq!(value["status"]["value"], "Presente");
    assert_eq!(value["telemetry"]["value"]["lamp_status"], "Ligada");
    assert_eq!(value["telemetry"]["value"]["temperatura"], 22.0);
    assert!(value["alert"].is_null());
}

#[tokio::test]
async fn index_page_is_served() {
    let app = create_router(AppState::new(
        Arc::new(HubState::new()),
        broadcast::channel::<String>(16).0,
        test_config(4),
    ));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collected");
    let html = String::from_utf8(body.to_vec()).expect("UTF-8 page");
    assert!(html.contains("EcoWork"));
}

#[tokio::test]
async fn metrics_endpoint_exposes_counters() {
    // Touch a counter so at least one family is registered.
    Metrics::bus_message_received("ecowork/telemetria");

    let app = create_router(AppState::new(
        Arc::new(HubState::new()),
        broadcast::channel::<String>(16).0,
        test_config(4),
    ));

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; version=0.0.4"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collected");
    let text = String::from_utf8(body.to_vec()).expect("UTF-8 exposition");
    assert!(text.contains("ecowork_bus_messages_total"));
}
