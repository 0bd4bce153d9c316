//! Error types for ecowork-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid telemetry JSON: {0}")]
    TelemetryParse(#[from] serde_json::Error),

    #[error("Telemetry payload must be a JSON object, got {0}")]
    TelemetryNotAnObject(&'static str),

    #[error("Event serialization failed: {0}")]
    EventSerialize(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
