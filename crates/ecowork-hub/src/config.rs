//! Application configuration.

use crate::error::{HubError, HubResult};
use ecowork_bus::BusConfig;
use ecowork_dashboard::DashboardConfig;
use ecowork_relay::{TopicMap, DEFAULT_LUMINOSITY_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// MQTT broker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusSection {
    /// Broker hostname. Default: the public HiveMQ broker the devices
    /// publish to.
    #[serde(default = "default_bus_host")]
    pub host: String,
    /// Broker TCP port. Default: 1883.
    #[serde(default = "default_bus_port")]
    pub port: u16,
    /// Keep-alive interval in seconds. Default: 60, matching the device
    /// firmware.
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    /// Client identifier presented to the broker.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Delay before retrying after a connection error, in seconds.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
    /// Capacity of the in-process channel between the bus consumer and the
    /// router. Messages beyond this are dropped, not queued.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_bus_host() -> String {
    "broker.hivemq.com".to_owned()
}

fn default_bus_port() -> u16 {
    1883
}

fn default_keepalive_secs() -> u64 {
    60
}

fn default_client_id() -> String {
    "ecowork-hub".to_owned()
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            host: default_bus_host(),
            port: default_bus_port(),
            keepalive_secs: default_keepalive_secs(),
            client_id: default_client_id(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Bus topic names, one per channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsSection {
    #[serde(default = "default_telemetry_topic")]
    pub telemetry: String,
    #[serde(default = "default_status_topic")]
    pub status: String,
    #[serde(default = "default_alert_topic")]
    pub alert: String,
}

fn default_telemetry_topic() -> String {
    "ecowork/telemetria".to_owned()
}

fn default_status_topic() -> String {
    "ecowork/status".to_owned()
}

fn default_alert_topic() -> String {
    "ecowork/alerta".to_owned()
}

impl Default for TopicsSection {
    fn default() -> Self {
        Self {
            telemetry: default_telemetry_topic(),
            status: default_status_topic(),
            alert: default_alert_topic(),
        }
    }
}

/// Lamp derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivationSection {
    /// Luminosity value at or above which the lamp is considered on while
    /// someone is present. The sensor scale is inverted: higher readings
    /// mean a darker room, so a reading this high means the lamp is lit.
    #[serde(default = "default_luminosity_threshold")]
    pub luminosity_threshold: f64,
}

fn default_luminosity_threshold() -> f64 {
    DEFAULT_LUMINOSITY_THRESHOLD
}

impl Default for DerivationSection {
    fn default() -> Self {
        Self {
            luminosity_threshold: default_luminosity_threshold(),
        }
    }
}

/// Top-level configuration for the hub binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub bus: BusSection,
    #[serde(default)]
    pub topics: TopicsSection,
    #[serde(default)]
    pub derivation: DerivationSection,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl HubConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> HubResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| HubError::Config(format!("Failed to read config file '{path}': {e}")))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| HubError::Config(format!("Failed to parse config file '{path}': {e}")))?;

        Ok(config)
    }

    /// Load configuration from `path` if it exists, defaults otherwise.
    ///
    /// Used for the implicit default path, where a missing file means "run
    /// with the built-in settings" rather than an error.
    pub fn from_file_or_default(path: &str) -> HubResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> HubResult<()> {
        if !self.derivation.luminosity_threshold.is_finite()
            || self.derivation.luminosity_threshold < 0.0
        {
            return Err(HubError::Config(format!(
                "luminosity_threshold must be a non-negative finite number, got {}",
                self.derivation.luminosity_threshold
            )));
        }
        let topics = [
            &self.topics.telemetry,
            &self.topics.status,
            &self.topics.alert,
        ];
        if topics.iter().any(|t| t.is_empty()) {
            return Err(HubError::Config("topic names must not be empty".to_owned()));
        }
        if topics[0] == topics[1] || topics[0] == topics[2] || topics[1] == topics[2] {
            return Err(HubError::Config(format!(
                "topic names must be distinct, got '{}', '{}', '{}'",
                topics[0], topics[1], topics[2]
            )));
        }
        if self.bus.channel_capacity == 0 {
            return Err(HubError::Config(
                "bus.channel_capacity must be at least 1".to_owned(),
            ));
        }
        if self.dashboard.enabled && self.dashboard.port == 0 {
            return Err(HubError::Config(
                "dashboard.port must be nonzero".to_owned(),
            ));
        }
        if self.dashboard.broadcast_capacity == 0 {
            return Err(HubError::Config(
                "dashboard.broadcast_capacity must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Bus consumer settings assembled from the `[bus]` and `[topics]`
    /// sections.
    pub fn bus_config(&self) -> BusConfig {
        BusConfig {
            host: self.bus.host.clone(),
            port: self.bus.port,
            keepalive_secs: self.bus.keepalive_secs,
            client_id: self.bus.client_id.clone(),
            topics: vec![
                self.topics.telemetry.clone(),
                self.topics.status.clone(),
                self.topics.alert.clone(),
            ],
            reconnect_delay_secs: self.bus.reconnect_delay_secs,
        }
    }

    pub fn topic_map(&self) -> TopicMap {
        TopicMap::new(
            self.topics.telemetry.clone(),
            self.topics.status.clone(),
            self.topics.alert.clone(),
        )
    }
}
