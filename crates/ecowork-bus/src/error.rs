//! Error types for ecowork-bus.

use thiserror::Error;

/// Bus error types.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),
}

/// Result type alias for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
