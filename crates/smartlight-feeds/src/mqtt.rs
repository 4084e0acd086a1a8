//! MQTT feed: subscribes to the device topic on the broker.
//!
//! Connection setup, TLS and reconnection belong to `rumqttc`; this module
//! only subscribes (again after every ConnAck, since the session is clean) and
//! passes each publish to [`ingest`].

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, MqttOptions, Packet, Publish, QoS,
    SubscribeReasonCode, Transport,
};
use smartlight_core::config::MqttConfig;
use smartlight_core::{ingest, LatestStateStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{Feed, FeedError};

const DEFAULT_PORT: u16 = 1883;
const DEFAULT_TLS_PORT: u16 = 8883;

/// Host, port and transport parsed from a broker URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

impl BrokerAddress {
    /// Parse `mqtt://`, `tcp://`, `mqtts://`, `ssl://` URLs or a bare
    /// `host[:port]` (plain TCP).
    pub fn parse(raw: &str) -> Result<Self, FeedError> {
        let invalid = |reason: &str| FeedError::InvalidBrokerUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("mqtt://{raw}")
        };
        let url = Url::parse(&candidate).map_err(|e| invalid(&e.to_string()))?;

        let tls = match url.scheme() {
            "mqtt" | "tcp" => false,
            "mqtts" | "ssl" => true,
            other => return Err(invalid(&format!("unsupported scheme {other:?}"))),
        };
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?
            .to_string();
        let port = url
            .port()
            .unwrap_or(if tls { DEFAULT_TLS_PORT } else { DEFAULT_PORT });

        Ok(Self { host, port, tls })
    }
}

/// Broker subscriber for the single device topic.
pub struct MqttFeed {
    options: MqttOptions,
    topic: String,
    reconnect_delay: Duration,
    channel_capacity: usize,
}

impl MqttFeed {
    pub fn from_config(config: &MqttConfig) -> Result<Self, FeedError> {
        let address = BrokerAddress::parse(&config.host)?;

        let mut options = MqttOptions::new(&config.client_id, &address.host, address.port);
        options.set_credentials(&config.username, &config.password);
        options.set_keep_alive(config.keep_alive());
        options.set_clean_session(true);
        if address.tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        Ok(Self {
            options,
            topic: config.topic.clone(),
            reconnect_delay: config.reconnect_delay(),
            channel_capacity: config.channel_capacity.max(1),
        })
    }

    pub fn options(&self) -> &MqttOptions {
        &self.options
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Feed for MqttFeed {
    fn name(&self) -> &'static str {
        "mqtt"
    }

    async fn run(
        self,
        store: Arc<LatestStateStore>,
        shutdown: CancellationToken,
    ) -> Result<(), FeedError> {
        let (broker_host, broker_port) = self.options.broker_address();
        info!(
            broker_host = %broker_host,
            broker_port,
            topic = %self.topic,
            "starting MQTT feed"
        );

        let (client, mut eventloop) = AsyncClient::new(self.options, self.channel_capacity);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("shutdown signal received");
                    let _ = client.disconnect().await;
                    return Ok(());
                }
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        if ack.code == ConnectReturnCode::Success {
                            info!("connected to MQTT broker");
                        } else {
                            warn!(code = ?ack.code, "broker refused connection");
                        }
                        request_subscribe(&client, &self.topic);
                    }
                    Ok(Event::Incoming(Packet::SubAck(ack))) => {
                        if ack.return_codes.iter().any(|c| *c == SubscribeReasonCode::Failure) {
                            error!(topic = %self.topic, "subscribe rejected by broker");
                        } else {
                            info!(topic = %self.topic, "subscribed to topic");
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        handle_publish(&store, &publish);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "MQTT event loop error");
                        tokio::select! {
                            _ = shutdown.cancelled() => return Ok(()),
                            _ = tokio::time::sleep(self.reconnect_delay) => {}
                        }
                    }
                },
            }
        }
    }
}

/// Queue a subscribe for `topic`. A failure is logged and left for the next
/// ConnAck to retry; returns whether the request was queued.
pub(crate) fn request_subscribe(client: &AsyncClient, topic: &str) -> bool {
    match client.try_subscribe(topic, QoS::AtMostOnce) {
        Ok(()) => true,
        Err(e) => {
            error!(topic, error = %e, "subscribe request failed");
            false
        }
    }
}

/// Pass one publish to the ingest path. Rejections are already logged there.
pub(crate) fn handle_publish(store: &LatestStateStore, publish: &Publish) {
    let _ = ingest(store, &publish.topic, &publish.payload);
}
