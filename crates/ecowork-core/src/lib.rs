//! Core domain types for the EcoWork telemetry hub.
//!
//! This crate provides the fundamental types shared across the hub:
//! - `TelemetryReading`: schema-flexible sensor sample with the derived lamp field
//! - `Presence`: presence-status channel value ("Presente"/"Ausente")
//! - `LampState`: derived on/off/not-applicable lamp indicator
//! - `ClientEvent`: outbound events pushed to connected dashboard clients

pub mod error;
pub mod event;
pub mod lamp;
pub mod presence;
pub mod reading;

pub use error::{CoreError, Result};
pub use event::ClientEvent;
pub use lamp::LampState;
pub use presence::Presence;
pub use reading::TelemetryReading;
