//! Lamp derivation rules.
//!
//! The LDR scale is inverted relative to perceived brightness: a LOW raw
//! value means a bright room. The lamp therefore turns on when the raw
//! reading is at or above the threshold (dark) and a person is present.

use ecowork_core::{LampState, Presence, TelemetryReading};

/// Default raw-LDR cutoff between "bright" and "dark".
pub const DEFAULT_LUMINOSITY_THRESHOLD: f64 = 1500.0;

/// Primary derivation rule, applied to every telemetry reading before it is
/// stored.
///
/// - present + luminosity below the threshold: off (room is bright)
/// - present + luminosity at or above the threshold: on (room is dark)
/// - present + luminosity missing or non-numeric: not applicable
/// - anything else, including no status received yet: off
pub fn derive_lamp_state(
    status: Option<&Presence>,
    reading: &TelemetryReading,
    threshold: f64,
) -> LampState {
    let present = status.is_some_and(Presence::is_present);
    match (present, reading.luminosity()) {
        (true, Some(luminosity)) if luminosity >= threshold => LampState::On,
        (true, Some(_)) => LampState::Off,
        (true, None) => LampState::NotApplicable,
        (false, _) => LampState::Off,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(json: &str) -> TelemetryReading {
        TelemetryReading::from_text(json).unwrap()
    }

    fn derive(status: Option<&str>, json: &str) -> LampState {
        let status = status.map(Presence::new);
        derive_lamp_state(
            status.as_ref(),
            &reading(json),
            DEFAULT_LUMINOSITY_THRESHOLD,
        )
    }

    #[test]
    fn present_and_bright_is_off() {
        assert_eq!(
            derive(Some("Presente"), r#"{"luminosidade": 1200}"#),
            LampState::Off
        );
    }

    #[test]
    fn present_and_dark_is_on() {
        assert_eq!(
            derive(Some("Presente"), r#"{"luminosidade": 2000}"#),
            LampState::On
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(
            derive(Some("Presente"), r#"{"luminosidade": 1500}"#),
            LampState::On
        );
        assert_eq!(
            derive(Some("Presente"), r#"{"luminosidade": 1499.99}"#),
            LampState::Off
        );
    }

    #[test]
    fn absent_is_off_regardless_of_luminosity() {
        assert_eq!(
            derive(Some("Ausente"), r#"{"luminosidade": 2000}"#),
            LampState::Off
        );
        assert_eq!(
            derive(Some("Ausente"), r#"{"luminosidade": 1200}"#),
            LampState::Off
        );
        assert_eq!(derive(Some("Ausente"), r#"{}"#), LampState::Off);
    }

    #[test]
    fn unknown_status_counts_as_not_present() {
        assert_eq!(
            derive(Some("Manutencao"), r#"{"luminosidade": 2000}"#),
            LampState::Off
        );
    }

    #[test]
    fn no_status_yet_is_off() {
        assert_eq!(derive(None, r#"{"luminosidade": 2000}"#), LampState::Off);
    }

    #[test]
    fn present_without_luminosity_is_not_applicable() {
        assert_eq!(
            derive(Some("Presente"), r#"{"temperatura": 22.5}"#),
            LampState::NotApplicable
        );
    }

    #[test]
    fn present_with_unusable_luminosity_is_not_applicable() {
        assert_eq!(
            derive(Some("Presente"), r#"{"luminosidade": "alta"}"#),
            LampState::NotApplicable
        );
        assert_eq!(
            derive(Some("Presente"), r#"{"luminosidade": null}"#),
            LampState::NotApplicable
        );
    }
}
