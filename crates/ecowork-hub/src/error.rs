//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bus error: {0}")]
    Bus(#[from] ecowork_bus::BusError),

    #[error("Dashboard error: {0}")]
    Dashboard(#[from] ecowork_dashboard::DashboardError),

    #[error("Observability error: {0}")]
    Observability(#[from] ecowork_observability::ObservabilityError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HubResult<T> = Result<T, HubError>;
