//! Application orchestration and main event loop.

use std::sync::Arc;
use std::time::Duration;

use ecowork_bus::{BusConsumer, BusMessage};
use ecowork_core::ClientEvent;
use ecowork_dashboard::run_server;
use ecowork_observability::Metrics;
use ecowork_relay::{HubState, MessageRouter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::HubConfig;
use crate::error::HubResult;

/// Capacity of the event channel feeding the dashboard broadcaster.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Interval between periodic statistics log lines.
const STATS_INTERVAL_SECS: u64 = 60;

/// Wires the bus consumer, the router and the dashboard together and runs
/// the hub until shutdown.
pub struct Application {
    config: HubConfig,
    state: Arc<HubState>,
    router: MessageRouter,
}

impl Application {
    pub fn new(config: HubConfig) -> HubResult<Self> {
        config.validate()?;
        let state = Arc::new(HubState::new());
        let router = MessageRouter::new(
            Arc::clone(&state),
            config.topic_map(),
            config.derivation.luminosity_threshold,
        );
        Ok(Self {
            config,
            state,
            router,
        })
    }

    /// Run the main event loop until Ctrl-C.
    pub async fn run(self) -> HubResult<()> {
        info!(
            telemetry_topic = %self.config.topics.telemetry,
            status_topic = %self.config.topics.status,
            alert_topic = %self.config.topics.alert,
            luminosity_threshold = self.config.derivation.luminosity_threshold,
            "Starting hub event loop"
        );

        let shutdown = CancellationToken::new();

        let (bus_tx, mut bus_rx) = mpsc::channel::<BusMessage>(self.config.bus.channel_capacity);
        let (event_tx, event_rx) = mpsc::channel::<ClientEvent>(EVENT_CHANNEL_CAPACITY);

        let consumer = BusConsumer::new(self.config.bus_config());
        let bus_task = tokio::spawn(consumer.run(bus_tx, shutdown.clone()));

        let dashboard_task = if self.config.dashboard.enabled {
            let state = Arc::clone(&self.state);
            let dashboard_config = self.config.dashboard.clone();
            tokio::spawn(async move {
                if let Err(e) = run_server(state, event_rx, dashboard_config).await {
                    error!(error = %e, "Dashboard server failed");
                }
            })
        } else {
            info!("Dashboard disabled by configuration");
            // Drain events so the channel never backs up without a consumer.
            tokio::spawn(async move {
                let mut event_rx = event_rx;
                while event_rx.recv().await.is_some() {}
            })
        };

        let mut stats_interval = tokio::time::interval(Duration::from_secs(STATS_INTERVAL_SECS));
        let mut messages_processed: u64 = 0;
        let mut events_emitted: u64 = 0;

        loop {
            tokio::select! {
                Some(message) = bus_rx.recv() => {
                    messages_processed += 1;
                    events_emitted += self.process_message(message, &event_tx).await;
                }
                _ = stats_interval.tick() => {
                    let snapshot = self.state.snapshot();
                    info!(
                        messages = messages_processed,
                        events = events_emitted,
                        has_telemetry = snapshot.telemetry.is_some(),
                        has_status = snapshot.status.is_some(),
                        has_alert = snapshot.alert.is_some(),
                        "Hub statistics"
                    );
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        shutdown.cancel();
        if let Err(e) = bus_task.await {
            warn!(error = %e, "Bus consumer task ended abnormally");
        }
        dashboard_task.abort();

        info!(
            messages = messages_processed,
            events = events_emitted,
            "Hub stopped"
        );
        Ok(())
    }

    /// Route one bus message, record metrics and forward the resulting
    /// events to the dashboard. Returns the number of events forwarded.
    async fn process_message(
        &self,
        message: BusMessage,
        event_tx: &mpsc::Sender<ClientEvent>,
    ) -> u64 {
        Metrics::bus_message_received(&message.topic);

        let events = self.router.handle(&message.topic, &message.payload);

        // The telemetry handler emits exactly one event per accepted
        // payload, so an empty result there means the payload was rejected.
        if events.is_empty() && message.topic == self.config.topics.telemetry {
            Metrics::payload_error();
        }
        // A telemetry event on the status channel is the forced lamp-off
        // correction.
        if message.topic == self.config.topics.status
            && events
                .iter()
                .any(|e| matches!(e, ClientEvent::TelemetryUpdated(_)))
        {
            Metrics::lamp_correction();
        }

        let mut forwarded = 0;
        for event in events {
            debug!(kind = event.kind(), "Forwarding client event");
            if event_tx.send(event).await.is_err() {
                warn!("Event channel closed, dropping client events");
                break;
            }
            forwarded += 1;
        }
        forwarded
    }

    /// Shared store handle, mainly for tests and embedding.
    pub fn state(&self) -> Arc<HubState> {
        Arc::clone(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DerivationSection;

    #[test]
    fn new_rejects_invalid_config() {
        let config = HubConfig {
            derivation: DerivationSection {
                luminosity_threshold: f64::INFINITY,
            },
            ..HubConfig::default()
        };
        assert!(Application::new(config).is_err());
    }

    #[test]
    fn new_accepts_default_config() {
        let app = Application::new(HubConfig::default()).expect("default config is valid");
        assert!(app.state().latest_telemetry().is_none());
    }
}
