//! ecowork-dashboard - Real-time web view of the EcoWork hub.
//!
//! Serves the dashboard page and fans router events out to every connected
//! WebSocket client:
//!
//! - REST API for fetching the current store contents
//! - WebSocket for real-time event push
//! - Static HTML dashboard UI
//! - Prometheus metrics exposition
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     ecowork-hub process                      │
//! │                                                              │
//! │   app loop ──ClientEvent──► mpsc ──► run_broadcaster         │
//! │      │                                    │                  │
//! │      ▼                                    ▼                  │
//! │  Arc<HubState>                 broadcast::Sender<String>     │
//! │      │                                    │                  │
//! │  ┌───┴────────────────────────────────────┴───────────────┐  │
//! │  │            axum HTTP server (port 5000)                │  │
//! │  │  GET /             → static HTML/JS                    │  │
//! │  │  GET /api/snapshot → JSON store contents               │  │
//! │  │  GET /ws           → WebSocket upgrade                  │  │
//! │  │  GET /metrics      → Prometheus text format             │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Newly connected clients receive no catch-up snapshot over the socket;
//! they see only events published after they connect. The snapshot endpoint
//! exists for pull-style reads.
//!
//! # Usage
//!
//! ```ignore
//! use ecowork_dashboard::{run_server, DashboardConfig};
//!
//! let (event_tx, event_rx) = tokio::sync::mpsc::channel(256);
//! let config = DashboardConfig::default();
//! tokio::spawn(async move {
//!     if let Err(e) = run_server(hub_state, event_rx, config).await {
//!         tracing::error!(error = %e, "Dashboard server failed");
//!     }
//! });
//! ```

pub mod broadcast;
pub mod config;
pub mod error;
pub mod server;
pub mod types;

pub use broadcast::run_broadcaster;
pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use server::{create_router, run_server, AppState, ConnectionLimiter};
pub use types::ApiSnapshot;
