//! Telemetry readings.
//!
//! The device publishes a flat JSON object of sensor values. The record is
//! schema-flexible: unknown keys pass through untouched and missing keys are
//! tolerated, so firmware changes do not break the hub.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};
use crate::lamp::LampState;

/// Latest telemetry sample, as decoded from the telemetry topic.
///
/// Recognized numeric keys are `temperatura`, `umidade`, `luminosidade` and
/// `distancia`, all optional. The `lamp_status` key is never part of the
/// inbound payload; it is injected after derivation, before the reading is
/// stored or broadcast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelemetryReading {
    fields: Map<String, Value>,
}

impl TelemetryReading {
    /// Key of the injected derived field.
    pub const LAMP_KEY: &'static str = "lamp_status";
    /// Key of the raw LDR reading used for lamp derivation.
    pub const LUMINOSITY_KEY: &'static str = "luminosidade";

    /// Decode a reading from payload text. Only JSON objects are accepted.
    pub fn from_text(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(CoreError::TelemetryNotAnObject(json_type_name(&other))),
        }
    }

    /// Raw luminosity, if present and numeric.
    ///
    /// A missing key, `null`, or a non-numeric value all return `None`; the
    /// derivation layer maps that to the not-applicable sentinel instead of
    /// failing.
    pub fn luminosity(&self) -> Option<f64> {
        self.numeric(Self::LUMINOSITY_KEY)
    }

    /// Any sensor field as a number, if present and numeric.
    pub fn numeric(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    /// The derived lamp field, if it has been injected.
    pub fn lamp_status(&self) -> Option<LampState> {
        self.fields
            .get(Self::LAMP_KEY)
            .and_then(Value::as_str)
            .and_then(LampState::from_wire)
    }

    /// Inject or overwrite the derived lamp field.
    pub fn set_lamp_status(&mut self, lamp: LampState) {
        self.fields.insert(
            Self::LAMP_KEY.to_owned(),
            Value::String(lamp.as_str().to_owned()),
        );
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
