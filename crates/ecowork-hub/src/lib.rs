//! EcoWork telemetry hub.
//!
//! Main application that orchestrates all components:
//! - MQTT bus subscription for the three device topics
//! - Message routing and lamp-state derivation
//! - Latest-value state store
//! - Web dashboard with WebSocket fan-out

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{HubConfig, DEFAULT_CONFIG_PATH};
pub use error::{HubError, HubResult};
