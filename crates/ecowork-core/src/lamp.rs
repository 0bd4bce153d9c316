//! Derived lamp indicator.
//!
//! The lamp field is never transmitted by the device. It is computed from
//! luminosity and presence and injected into each stored telemetry reading.

use serde::{Deserialize, Serialize};

/// Lamp state derived from luminosity and presence.
///
/// Wire values are the Portuguese strings the dashboard renders:
/// `"Ligada"`, `"Desligada"`, `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LampState {
    /// Lamp on: person present and the room is dark.
    #[serde(rename = "Ligada")]
    On,
    /// Lamp off: room bright enough, or nobody present.
    #[serde(rename = "Desligada")]
    Off,
    /// Luminosity missing or unusable while a person is present.
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl LampState {
    /// Wire string for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "Ligada",
            Self::Off => "Desligada",
            Self::NotApplicable => "N/A",
        }
    }

    /// Parse a wire string back into a state.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "Ligada" => Some(Self::On),
            "Desligada" => Some(Self::Off),
            "N/A" => Some(Self::NotApplicable),
            _ => None,
        }
    }

    /// Check if the lamp is off.
    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

impl std::fmt::Display for LampState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
