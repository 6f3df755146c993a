//! MQTT integration for live telemetry.
//!
//! This module subscribes to a broker topic carrying JSON snapshots and
//! forwards them to the TUI via a watch channel, enabling real-time
//! monitoring of a live greenhouse.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   Greenhouse Controller                   │
//! │  ┌─────────┐    ┌──────────────────────────────────────┐  │
//! │  │ Sensors │───▶│ MQTT broker (topic publish)          │  │
//! │  └─────────┘    └──────────────────┬───────────────────┘  │
//! └────────────────────────────────────┼──────────────────────┘
//!                                      │
//!                                      ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                    greenwatch Process                     │
//! │  ┌──────────────────────────┐    ┌─────────────────────┐  │
//! │  │ MQTT client (subscribe)  │───▶│ forward task        │  │
//! │  └──────────────────────────┘    └──────────┬──────────┘  │
//! │                                             │ watch::Sender│
//! │                                             ▼              │
//! │                                ┌─────────────────────┐     │
//! │                                │ ChannelSource (TUI) │     │
//! │                                └─────────────────────┘     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Subscribe to snapshots from an MQTT broker
//! greenwatch --subscribe broker.toml --topic greenhouse/telemetry
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tracing::{debug, error, info, warn};

use crate::source::{ChannelSource, TelemetrySnapshot};

/// Broker connection settings, loaded from a TOML file.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
}

impl BrokerSettings {
    /// Load settings from a config file, with `GREENWATCH_*` environment
    /// overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(config_path))
            .add_source(Environment::with_prefix("GREENWATCH"))
            .build()
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        Ok(Self {
            host: config
                .get_string("mqtt.host")
                .context("mqtt.host is required")?,
            port: config.get_int("mqtt.port").unwrap_or(1883) as u16,
            client_id: config
                .get_string("mqtt.client_id")
                .unwrap_or_else(|_| "greenwatch".to_string()),
            username: config.get_string("mqtt.username").ok(),
            password: config.get_string("mqtt.password").ok(),
            keep_alive_secs: config.get_int("mqtt.keep_alive").unwrap_or(30) as u64,
        })
    }
}

/// Subscribe to telemetry snapshots on the given topic.
///
/// Returns a [`ChannelSource`] for the TUI plus the background task handle.
/// The task runs until the source (and its receiver) is dropped.
pub async fn create_subscriber(
    config_path: &Path,
    topic: &str,
) -> Result<(ChannelSource, tokio::task::JoinHandle<()>)> {
    let settings = BrokerSettings::load(config_path)?;

    // Create the channel for forwarding snapshots
    let (tx, source) = ChannelSource::create(&format!(
        "mqtt://{}:{}/{}",
        settings.host, settings.port, topic
    ));

    let mut options = MqttOptions::new(
        settings.client_id.clone(),
        settings.host.clone(),
        settings.port,
    );
    options.set_keep_alive(Duration::from_secs(settings.keep_alive_secs));

    if let (Some(username), Some(password)) = (settings.username, settings.password) {
        options.set_credentials(username, password);
    }

    let (client, mut eventloop) = AsyncClient::new(options, 16);

    info!(topic, host = %settings.host, "subscribing to telemetry");
    client
        .subscribe(topic, QoS::AtLeastOnce)
        .await
        .context("MQTT subscribe failed")?;

    let topic = topic.to_string();
    let handle = tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    match serde_json::from_slice::<TelemetrySnapshot>(&publish.payload) {
                        Ok(snapshot) => {
                            debug!(readings = snapshot.len(), "received telemetry snapshot");
                            if tx.send(snapshot).is_err() {
                                // Receiver dropped, exit
                                info!("TUI receiver dropped, stopping subscriber");
                                return;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse telemetry payload: {}", e);
                        }
                    }
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("Connection established with broker");
                    // Re-subscribe so reconnects keep receiving
                    if let Err(e) = client.subscribe(topic.clone(), QoS::AtLeastOnce).await {
                        error!("Failed to re-subscribe to '{}': {}", topic, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT connection error: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    });

    Ok((source, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_settings_load_with_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[mqtt]\nhost = \"broker.local\"").unwrap();

        let settings = BrokerSettings::load(file.path()).unwrap();
        assert_eq!(settings.host, "broker.local");
        assert_eq!(settings.port, 1883);
        assert_eq!(settings.client_id, "greenwatch");
        assert!(settings.username.is_none());
    }

    #[test]
    fn test_settings_require_host() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[mqtt]\nport = 1884").unwrap();

        assert!(BrokerSettings::load(file.path()).is_err());
    }
}
