//! Error types for ecowork-dashboard.

use thiserror::Error;

/// Dashboard error types.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Dashboard server IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = std::result::Result<T, DashboardError>;
