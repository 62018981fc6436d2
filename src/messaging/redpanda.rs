use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    message::{Header, OwnedHeaders},
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};
use std::time::Duration;

use crate::config::BrokerConfig;

use super::errors::PublishError;

/// Message header naming where a record came from.
pub const ORIGIN_HEADER: &str = "origin";

/// Where a published record was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Bulk CSV import, persisted by the topic sink
    Import,
    /// Manual entry, persisted by the entry form itself
    Entry,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Import => "import",
            Origin::Entry => "entry",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "import" => Some(Origin::Import),
            "entry" => Some(Origin::Entry),
            _ => None,
        }
    }
}

/// Transport seam: anything that can put one payload on a topic.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &str, origin: Origin) -> Result<(), PublishError>;
}

pub struct RedpandaClient {
    producer: FutureProducer,
    send_timeout: Duration,
}

impl RedpandaClient {
    pub fn new(config: &BrokerConfig) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("message.timeout.ms", config.message_timeout.as_millis().to_string())
            .create()
            .map_err(|e| PublishError::Client(e.to_string()))?;

        tracing::info!(
            brokers = %config.bootstrap_servers,
            "Created Redpanda producer"
        );

        Ok(Self {
            producer,
            send_timeout: config.message_timeout,
        })
    }
}

#[async_trait]
impl Publisher for RedpandaClient {
    async fn publish(&self, topic: &str, key: &str, payload: &str, origin: Origin) -> Result<(), PublishError> {
        let headers = OwnedHeaders::new().insert(Header {
            key: ORIGIN_HEADER,
            value: Some(origin.as_str()),
        });

        let record = FutureRecord::to(topic)
            .key(key)
            .payload(payload)
            .headers(headers);

        match self.producer.send(record, Timeout::After(self.send_timeout)).await {
            Ok(_) => {
                tracing::debug!(
                    topic = %topic,
                    key = %key,
                    origin = origin.as_str(),
                    "Published to Redpanda"
                );
                Ok(())
            }
            Err((e, _)) => {
                tracing::error!(
                    error = %e,
                    topic = %topic,
                    "Failed to publish to Redpanda"
                );
                Err(PublishError::Send {
                    topic: topic.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
