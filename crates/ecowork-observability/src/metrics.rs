//! Prometheus metrics for the EcoWork hub.
//!
//! Covers the full message path: bus traffic in, dropped payloads, events
//! broadcast out, forced lamp corrections and connected dashboard clients.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent
//! failure. These panics only occur during static initialization, never at
//! runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_int_counter, register_int_gauge, CounterVec, IntCounter,
    IntGauge, TextEncoder,
};

use crate::error::ObservabilityResult;

/// Total bus messages received, labeled by topic.
pub static BUS_MESSAGES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ecowork_bus_messages_total",
        "Total messages received from the bus",
        &["topic"]
    )
    .unwrap()
});

/// Total telemetry payloads dropped as malformed.
pub static PAYLOAD_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "ecowork_payload_errors_total",
        "Total telemetry payloads dropped because they could not be decoded"
    )
    .unwrap()
});

/// Total events fanned out to clients, labeled by event kind.
pub static EVENTS_BROADCAST_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ecowork_events_broadcast_total",
        "Total events published on the client broadcast channel",
        &["kind"]
    )
    .unwrap()
});

/// Total lamp states forced off after a presence loss.
pub static LAMP_CORRECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "ecowork_lamp_corrections_total",
        "Total stored lamp states forced off by an absence transition"
    )
    .unwrap()
});

/// Currently connected dashboard WebSocket clients.
pub static WS_CLIENTS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "ecowork_ws_clients",
        "Currently connected dashboard WebSocket clients"
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record one message received from the bus.
    pub fn bus_message_received(topic: &str) {
        BUS_MESSAGES_TOTAL.with_label_values(&[topic]).inc();
    }

    /// Record one dropped telemetry payload.
    pub fn payload_error() {
        PAYLOAD_ERRORS_TOTAL.inc();
    }

    /// Record one event published to the broadcast channel.
    pub fn event_broadcast(kind: &str) {
        EVENTS_BROADCAST_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record one forced lamp correction.
    pub fn lamp_correction() {
        LAMP_CORRECTIONS_TOTAL.inc();
    }

    /// Record a dashboard client connecting.
    pub fn client_connected() {
        WS_CLIENTS.inc();
    }

    /// Record a dashboard client disconnecting.
    pub fn client_disconnected() {
        WS_CLIENTS.dec();
    }

    /// Render all registered metrics in Prometheus text format.
    pub fn render() -> ObservabilityResult<String> {
        let encoder = TextEncoder::new();
        Ok(encoder.encode_to_string(&prometheus::gather())?)
    }
}
