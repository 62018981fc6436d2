use std::sync::Arc;

use rdkafka::{
    config::ClientConfig,
    consumer::{Consumer, StreamConsumer},
    message::{BorrowedMessage, Headers, Message},
};

use crate::config::BrokerConfig;
use crate::errors::PipelineError;
use crate::metrics::Metrics;
use crate::store::TransactionStore;

use super::errors::PublishError;
use super::redpanda::{Origin, ORIGIN_HEADER};
use super::wire::decode_record;

// ============================================================================
// Topic Sink - consumer-side write path
// ============================================================================
//
// Reads the topic from the earliest offset and appends each imported record
// to the store. Entries made through the entry form are already persisted by
// the form and are skipped. Nothing is deduplicated: replaying the topic
// appends the same rows again.
//
// ============================================================================

/// What happened to one consumed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOutcome {
    Inserted,
    SkippedEntry,
    EmptyPayload,
    Undecodable,
    InsertFailed,
}

impl SinkOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkOutcome::Inserted => "inserted",
            SinkOutcome::SkippedEntry => "skipped_entry",
            SinkOutcome::EmptyPayload => "empty_payload",
            SinkOutcome::Undecodable => "undecodable",
            SinkOutcome::InsertFailed => "insert_failed",
        }
    }
}

/// Broker-independent part of the sink: payload in, row out.
pub struct SinkHandler {
    store: Arc<TransactionStore>,
    metrics: Arc<Metrics>,
}

impl SinkHandler {
    pub fn new(store: Arc<TransactionStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// Messages without an origin header are treated as imports.
    pub async fn handle(&self, payload: Option<&[u8]>, origin: Option<Origin>) -> SinkOutcome {
        let outcome = self.process(payload, origin).await;
        self.metrics.record_sink_outcome(outcome.as_str());
        outcome
    }

    async fn process(&self, payload: Option<&[u8]>, origin: Option<Origin>) -> SinkOutcome {
        if origin == Some(Origin::Entry) {
            return SinkOutcome::SkippedEntry;
        }

        let Some(payload) = payload else {
            tracing::warn!("Skipping message without payload");
            return SinkOutcome::EmptyPayload;
        };

        let record = match decode_record(payload) {
            Ok(record) => record,
            Err(e) => {
                let error = PipelineError::Codec(e);
                tracing::warn!(error = %error, "Skipping undecodable message");
                return SinkOutcome::Undecodable;
            }
        };

        match self.store.insert(&record).await {
            Ok(()) => SinkOutcome::Inserted,
            // Logged by the store; keep consuming.
            Err(_) => SinkOutcome::InsertFailed,
        }
    }
}

pub struct TopicSink {
    consumer: StreamConsumer,
    topic: String,
    handler: SinkHandler,
}

impl TopicSink {
    pub fn new(config: &BrokerConfig, handler: SinkHandler) -> Result<Self, PublishError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "true")
            .create()
            .map_err(|e| PublishError::Client(e.to_string()))?;

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
            handler,
        })
    }

    /// Consume until the process is stopped.
    pub async fn run(&self) -> Result<(), PublishError> {
        self.consumer
            .subscribe(&[self.topic.as_str()])
            .map_err(|e| PublishError::Client(e.to_string()))?;

        tracing::info!(topic = %self.topic, "📥 Topic sink subscribed");

        loop {
            match self.consumer.recv().await {
                Ok(message) => {
                    let origin = origin_of(&message);
                    let outcome = self.handler.handle(message.payload(), origin).await;

                    tracing::debug!(
                        partition = message.partition(),
                        offset = message.offset(),
                        outcome = outcome.as_str(),
                        "Consumed message"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Kafka receive error");
                }
            }
        }
    }
}

fn origin_of(message: &BorrowedMessage<'_>) -> Option<Origin> {
    let headers = message.headers()?;
    headers
        .iter()
        .find(|header| header.key == ORIGIN_HEADER)
        .and_then(|header| header.value)
        .and_then(|value| std::str::from_utf8(value).ok())
        .and_then(Origin::parse)
}
