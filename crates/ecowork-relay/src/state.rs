//! Latest-value store for the three bus channels.
//!
//! Holds the most recent telemetry reading, presence status and alert, each
//! stamped with its arrival time. Nothing is versioned or persisted: a
//! restart loses everything and clients see a blank state until the next
//! message per topic arrives.

use chrono::{DateTime, Utc};
use ecowork_core::{LampState, Presence, TelemetryReading};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

/// A stored channel value plus the time it arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot<T> {
    pub value: T,
    pub received_at: DateTime<Utc>,
}

impl<T> ChannelSnapshot<T> {
    fn now(value: T) -> Self {
        Self {
            value,
            received_at: Utc::now(),
        }
    }
}

/// Point-in-time view of the whole store. Channels with no data yet
/// serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub telemetry: Option<ChannelSnapshot<TelemetryReading>>,
    pub status: Option<ChannelSnapshot<Presence>>,
    pub alert: Option<ChannelSnapshot<String>>,
}

#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    pub(crate) telemetry: Option<ChannelSnapshot<TelemetryReading>>,
    pub(crate) status: Option<ChannelSnapshot<Presence>>,
    pub(crate) alert: Option<ChannelSnapshot<String>>,
}

impl StoreInner {
    pub(crate) fn status_value(&self) -> Option<&Presence> {
        self.status.as_ref().map(|entry| &entry.value)
    }

    pub(crate) fn set_telemetry(&mut self, reading: TelemetryReading) {
        self.telemetry = Some(ChannelSnapshot::now(reading));
    }

    pub(crate) fn set_status(&mut self, status: Presence) {
        self.status = Some(ChannelSnapshot::now(status));
    }

    pub(crate) fn set_alert(&mut self, alert: String) {
        self.alert = Some(ChannelSnapshot::now(alert));
    }

    /// Force the stored reading's lamp field to off.
    ///
    /// Returns the corrected reading when a change was made. No reading
    /// stored, or a reading that is already off, returns `None`. The arrival
    /// stamp is left untouched: only the derived field changed, not the
    /// sample.
    pub(crate) fn force_lamp_off(&mut self) -> Option<TelemetryReading> {
        let entry = self.telemetry.as_mut()?;
        let already_off = entry
            .value
            .lamp_status()
            .map(|lamp| lamp.is_off())
            .unwrap_or(false);
        if already_off {
            return None;
        }
        entry.value.set_lamp_status(LampState::Off);
        Some(entry.value.clone())
    }
}

/// Shared latest-value store.
///
/// All reads and writes go through one mutex. The router takes the lock once
/// per message and performs its full read-derive-write sequence inside it;
/// readers only ever see fully applied updates.
#[derive(Debug, Default)]
pub struct HubState {
    inner: Mutex<StoreInner>,
}

impl HubState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock()
    }

    /// Clone the current contents of all three channels.
    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.lock();
        StateSnapshot {
            telemetry: inner.telemetry.clone(),
            status: inner.status.clone(),
            alert: inner.alert.clone(),
        }
    }

    pub fn latest_telemetry(&self) -> Option<ChannelSnapshot<TelemetryReading>> {
        self.inner.lock().telemetry.clone()
    }

    pub fn latest_status(&self) -> Option<ChannelSnapshot<Presence>> {
        self.inner.lock().status.clone()
    }

    pub fn latest_alert(&self) -> Option<ChannelSnapshot<String>> {
        self.inner.lock().alert.clone()
    }
}
