//! Topic dispatch and message handling.

use std::sync::Arc;

use ecowork_core::{ClientEvent, Presence, TelemetryReading};
use tracing::{debug, info, warn};

use crate::derivation::derive_lamp_state;
use crate::state::HubState;

/// The three bus topics the hub subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMap {
    pub telemetry: String,
    pub status: String,
    pub alert: String,
}

impl TopicMap {
    pub fn new(
        telemetry: impl Into<String>,
        status: impl Into<String>,
        alert: impl Into<String>,
    ) -> Self {
        Self {
            telemetry: telemetry.into(),
            status: status.into(),
            alert: alert.into(),
        }
    }

    /// All topic names, in subscription order.
    pub fn all(&self) -> [&str; 3] {
        [&self.telemetry, &self.status, &self.alert]
    }

    fn channel_for(&self, topic: &str) -> Option<Channel> {
        if topic == self.telemetry {
            Some(Channel::Telemetry)
        } else if topic == self.status {
            Some(Channel::Status)
        } else if topic == self.alert {
            Some(Channel::Alert)
        } else {
            None
        }
    }
}

impl Default for TopicMap {
    fn default() -> Self {
        Self::new("ecowork/telemetria", "ecowork/status", "ecowork/alerta")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Telemetry,
    Status,
    Alert,
}

/// Routes each bus message to its channel handler and returns the events to
/// fan out.
///
/// `handle` never fails and never panics on payload content: malformed
/// telemetry is dropped with a warning, unknown topics are ignored, invalid
/// UTF-8 is replaced. One bad message cannot disrupt the next.
#[derive(Debug)]
pub struct MessageRouter {
    state: Arc<HubState>,
    topics: TopicMap,
    luminosity_threshold: f64,
}

impl MessageRouter {
    pub fn new(state: Arc<HubState>, topics: TopicMap, luminosity_threshold: f64) -> Self {
        Self {
            state,
            topics,
            luminosity_threshold,
        }
    }

    /// Handle one inbound bus message.
    ///
    /// Returns the outbound events in emission order. Events of the same
    /// kind must reach clients in the order returned here.
    pub fn handle(&self, topic: &str, payload: &[u8]) -> Vec<ClientEvent> {
        let Some(channel) = self.topics.channel_for(topic) else {
            debug!(topic = %topic, "Ignoring message on unknown topic");
            return Vec::new();
        };

        let text = String::from_utf8_lossy(payload);
        let text = text.trim();
        debug!(topic = %topic, payload = %text, "Bus message received");

        match channel {
            Channel::Telemetry => self.handle_telemetry(text),
            Channel::Status => self.handle_status(text),
            Channel::Alert => self.handle_alert(text),
        }
    }

    /// Decode, derive the lamp field, store, emit.
    fn handle_telemetry(&self, text: &str) -> Vec<ClientEvent> {
        let mut reading = match TelemetryReading::from_text(text) {
            Ok(reading) => reading,
            Err(err) => {
                warn!(error = %err, payload = %text, "Dropping malformed telemetry payload");
                return Vec::new();
            }
        };

        let lamp = {
            let mut store = self.state.lock();
            let lamp = derive_lamp_state(store.status_value(), &reading, self.luminosity_threshold);
            reading.set_lamp_status(lamp);
            store.set_telemetry(reading.clone());
            lamp
        };

        debug!(lamp = %lamp, "Telemetry reading stored");
        vec![ClientEvent::TelemetryUpdated(reading)]
    }

    /// Store the status and, on transition to absent, force the stored lamp
    /// field off and re-emit the corrected reading.
    ///
    /// The whole sequence runs under one lock acquisition so a telemetry
    /// message racing this one can neither overwrite the correction nor
    /// lose its own reading.
    fn handle_status(&self, text: &str) -> Vec<ClientEvent> {
        let status = Presence::new(text);
        let mut events = Vec::with_capacity(2);
        events.push(ClientEvent::StatusUpdated(text.to_owned()));

        {
            let mut store = self.state.lock();
            store.set_status(status.clone());
            if status.is_absent() {
                if let Some(corrected) = store.force_lamp_off() {
                    info!("Presence lost, forcing stored lamp state off");
                    events.push(ClientEvent::TelemetryUpdated(corrected));
                }
            }
        }

        events
    }

    fn handle_alert(&self, text: &str) -> Vec<ClientEvent> {
        self.state.lock().set_alert(text.to_owned());
        vec![ClientEvent::AlertRaised(text.to_owned())]
    }
}
