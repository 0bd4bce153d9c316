//! Prometheus metrics and structured logging for the EcoWork hub.
//!
//! - Counters for bus traffic, dropped payloads, broadcast events and
//!   forced lamp corrections
//! - A gauge for connected dashboard clients
//! - Structured logging with tracing, JSON in production

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{ObservabilityError, ObservabilityResult};
pub use logging::init_logging;
pub use metrics::Metrics;
