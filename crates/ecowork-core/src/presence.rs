//! Presence-status channel value.

use serde::{Deserialize, Serialize};

/// Presence status as published on the status topic.
///
/// Only two values are meaningful to lamp derivation: [`Presence::PRESENT`]
/// and [`Presence::ABSENT`]. Any other string is treated as "not present"
/// for derivation but is still stored and rebroadcast verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Presence(String);

impl Presence {
    /// A person is detected near the device.
    pub const PRESENT: &'static str = "Presente";
    /// Nobody is detected near the device.
    pub const ABSENT: &'static str = "Ausente";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True only for the exact `"Presente"` value.
    pub fn is_present(&self) -> bool {
        self.0 == Self::PRESENT
    }

    /// True only for the exact `"Ausente"` value.
    ///
    /// Not the negation of [`is_present`](Self::is_present): an unrecognized
    /// status is neither present nor absent.
    pub fn is_absent(&self) -> bool {
        self.0 == Self::ABSENT
    }
}

impl From<&str> for Presence {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Presence {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_present_and_absent() {
        assert!(Presence::new("Presente").is_present());
        assert!(!Presence::new("Presente").is_absent());
        assert!(Presence::new("Ausente").is_absent());
        assert!(!Presence::new("Ausente").is_present());
    }

    #[test]
    fn unknown_status_is_neither() {
        let status = Presence::new("Manutencao");
        assert!(!status.is_present());
        assert!(!status.is_absent());
        assert_eq!(status.as_str(), "Manutencao");
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!Presence::new("presente").is_present());
        assert!(!Presence::new("AUSENTE").is_absent());
    }

    #[test]
    fn serializes_as_bare_string() {
        let json = serde_json::to_string(&Presence::new("Presente")).unwrap();
        assert_eq!(json, "\"Presente\"");
        let back: Presence = serde_json::from_str(&json).unwrap();
        assert!(back.is_present());
    }
}
