//! Outbound events pushed to connected dashboard clients.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::reading::TelemetryReading;

/// One event on the client fan-out channel.
///
/// Wire format is a tagged envelope with a single `value` field:
///
/// ```json
/// {"type":"telemetry_updated","value":{"luminosidade":2000,"lamp_status":"Ligada"}}
/// {"type":"status_updated","value":"Presente"}
/// {"type":"alert_raised","value":"ALERTA: Temperatura alta!"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ClientEvent {
    /// A new or corrected telemetry reading, `lamp_status` included.
    TelemetryUpdated(TelemetryReading),
    /// The raw presence-status string.
    StatusUpdated(String),
    /// The raw alert string.
    AlertRaised(String),
}

impl ClientEvent {
    /// Stable event-kind label, used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TelemetryUpdated(_) => "telemetry_updated",
            Self::StatusUpdated(_) => "status_updated",
            Self::AlertRaised(_) => "alert_raised",
        }
    }

    /// Serialize to the wire JSON sent over each WebSocket.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CoreError::EventSerialize(e.to_string()))
    }
}
