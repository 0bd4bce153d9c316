//! Observability error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),

    #[error("Metrics encoding failed: {0}")]
    Encode(#[from] prometheus::Error),
}

pub type ObservabilityResult<T> = Result<T, ObservabilityError>;
