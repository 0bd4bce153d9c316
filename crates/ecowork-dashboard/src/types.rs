//! Wire types for the REST surface.
//!
//! The WebSocket wire format is `ecowork_core::ClientEvent`; this module
//! only adds the snapshot envelope returned by `GET /api/snapshot`.

use chrono::Utc;
use ecowork_core::{Presence, TelemetryReading};
use ecowork_relay::{ChannelSnapshot, StateSnapshot};
use serde::{Deserialize, Serialize};

/// Envelope returned by `GET /api/snapshot`.
///
/// Channels carry `null` until their first message arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSnapshot {
    /// Server time when the snapshot was taken, epoch milliseconds.
    pub timestamp_ms: i64,
    pub telemetry: Option<ChannelSnapshot<TelemetryReading>>,
    pub status: Option<ChannelSnapshot<Presence>>,
    pub alert: Option<ChannelSnapshot<String>>,
}

impl From<StateSnapshot> for ApiSnapshot {
    fn from(snapshot: StateSnapshot) -> Self {
        Self {
            timestamp_ms: Utc::now().timestamp_millis(),
            telemetry: snapshot.telemetry,
            status: snapshot.status,
            alert: snapshot.alert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_serializes_with_nulls() {
        let snapshot = ApiSnapshot::from(StateSnapshot::default());
        let value = serde_json::to_value(&snapshot).unwrap();

        assert!(value["timestamp_ms"].is_i64());
        assert!(value["telemetry"].is_null());
        assert!(value["status"].is_null());
        assert!(value["alert"].is_null());
    }

    #[test]
    fn populated_snapshot_keeps_channel_values() {
        let state = StateSnapshot {
            status: Some(ChannelSnapshot {
                value: Presence::new("Presente"),
                received_at: Utc::now(),
            }),
            ..Default::default()
        };

        let value = serde_json::to_value(ApiSnapshot::from(state)).unwrap();
        assert_eq!(value["status"]["value"], "Presente");
        assert!(value["status"]["received_at"].is_string());
    }
}
