//! MQTT connection handling and message delivery.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::message::BusMessage;

/// Event loop channel capacity passed to rumqttc.
const EVENT_LOOP_CAPACITY: usize = 64;

/// Bus connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    pub host: String,
    pub port: u16,
    pub keepalive_secs: u64,
    pub client_id: String,
    /// Topics subscribed after every connection acknowledgment.
    pub topics: Vec<String>,
    /// Delay before polling again after a connection error.
    pub reconnect_delay_secs: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            host: "broker.hivemq.com".to_owned(),
            port: 1883,
            keepalive_secs: 60,
            client_id: "ecowork-hub".to_owned(),
            topics: vec![
                "ecowork/telemetria".to_owned(),
                "ecowork/status".to_owned(),
                "ecowork/alerta".to_owned(),
            ],
            reconnect_delay_secs: 5,
        }
    }
}

/// Owns the MQTT client and its event loop.
///
/// Runs until cancelled. Connection errors are logged and retried after a
/// fixed delay; subscriptions are re-issued on every connection
/// acknowledgment so a broker reconnect restores them.
pub struct BusConsumer {
    config: BusConfig,
}

impl BusConsumer {
    pub fn new(config: BusConfig) -> Self {
        Self { config }
    }

    /// Drive the event loop, forwarding publishes into `tx`.
    ///
    /// Delivery into the channel is non-blocking: when the hub cannot keep
    /// up the message is dropped with a warning (at-most-once is acceptable
    /// on this bus).
    pub async fn run(self, tx: mpsc::Sender<BusMessage>, shutdown: CancellationToken) {
        let mut options = MqttOptions::new(
            &self.config.client_id,
            &self.config.host,
            self.config.port,
        );
        options.set_keep_alive(Duration::from_secs(self.config.keepalive_secs));
        options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(options, EVENT_LOOP_CAPACITY);
        info!(
            host = %self.config.host,
            port = self.config.port,
            client_id = %self.config.client_id,
            "Connecting to MQTT broker"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Bus consumer shutting down");
                    break;
                }
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                        info!("Connected to MQTT broker");
                        if let Err(err) = self.subscribe_all(&client).await {
                            error!(error = %err, "Topic subscription failed");
                        }
                    }
                    Ok(Event::Incoming(Incoming::Publish(publish))) => {
                        let message = BusMessage::new(publish.topic, publish.payload.to_vec());
                        match tx.try_send(message) {
                            Ok(()) => {}
                            Err(mpsc::error::TrySendError::Full(dropped)) => {
                                warn!(topic = %dropped.topic, "Inbound channel full, dropping bus message");
                            }
                            Err(mpsc::error::TrySendError::Closed(_)) => {
                                info!("Inbound channel closed, stopping bus consumer");
                                break;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(err) => {
                        error!(error = %err, "MQTT connection error, retrying");
                        tokio::select! {
                            _ = shutdown.cancelled() => {
                                info!("Bus consumer shutting down");
                                break;
                            }
                            _ = tokio::time::sleep(
                                Duration::from_secs(self.config.reconnect_delay_secs),
                            ) => {}
                        }
                    }
                }
            }
        }
    }

    async fn subscribe_all(&self, client: &AsyncClient) -> Result<()> {
        for topic in &self.config.topics {
            client.subscribe(topic, QoS::AtMostOnce).await?;
            info!(topic = %topic, "Subscribed to bus topic");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_firmware() {
        let config = BusConfig::default();
        assert_eq!(config.host, "broker.hivemq.com");
        assert_eq!(config.port, 1883);
        assert_eq!(config.keepalive_secs, 60);
        assert_eq!(
            config.topics,
            vec!["ecowork/telemetria", "ecowork/status", "ecowork/alerta"]
        );
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let config = BusConfig {
            // Nothing listens here; poll fails fast and the consumer must
            // still notice the cancelled token during its retry delay.
            host: "127.0.0.1".to_owned(),
            port: 1,
            reconnect_delay_secs: 30,
            ..BusConfig::default()
        };
        let (tx, _rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let consumer = BusConsumer::new(config);
        tokio::time::timeout(Duration::from_secs(5), consumer.run(tx, shutdown))
            .await
            .expect("consumer did not stop after cancellation");
    }
}
