//! MQTT bus consumer for the EcoWork hub.
//!
//! Subscribes to the configured topics and forwards every publish as a raw
//! `(topic, payload)` pair over an mpsc channel. Connection handling stays in
//! this crate: the rest of the hub only ever sees `BusMessage`s.

pub mod consumer;
pub mod error;
pub mod message;

pub use consumer::{BusConfig, BusConsumer};
pub use error::{BusError, Result};
pub use message::BusMessage;
