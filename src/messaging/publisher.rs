use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PublisherConfig;
use crate::domain::transaction::TransactionRecord;
use crate::metrics::Metrics;

use super::errors::PublishError;
use super::redpanda::{Origin, Publisher};
use super::wire::encode_record;

// ============================================================================
// Event Publisher - paced, fail-fast
// ============================================================================
//
// Records go out one at a time in input order, keyed by account, with a fixed
// sleep after every send to simulate streaming arrival. The first failed send
// aborts the batch; nothing is retried.
//
// ============================================================================

pub struct EventPublisher<P: Publisher> {
    transport: P,
    topic: String,
    pacing: Duration,
    metrics: Arc<Metrics>,
}

impl<P: Publisher> EventPublisher<P> {
    pub fn new(transport: P, topic: impl Into<String>, config: &PublisherConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            transport,
            topic: topic.into(),
            pacing: config.pacing,
            metrics,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn transport(&self) -> &P {
        &self.transport
    }

    /// Publish `records` in order. Returns the number of messages sent.
    pub async fn publish_batch(&self, records: &[TransactionRecord], origin: Origin) -> Result<usize, PublishError> {
        for (index, record) in records.iter().enumerate() {
            if let Err(e) = self.publish_one(record, origin).await {
                tracing::error!(
                    topic = %self.topic,
                    sent = index,
                    remaining = records.len() - index,
                    error = %e,
                    "Aborting batch after failed send"
                );
                return Err(e);
            }
        }

        tracing::info!(
            topic = %self.topic,
            count = records.len(),
            origin = origin.as_str(),
            "Sent records to topic"
        );

        Ok(records.len())
    }

    /// Send a single record, then wait out the pacing delay. Nothing is
    /// waited on failure.
    pub async fn publish_one(&self, record: &TransactionRecord, origin: Origin) -> Result<(), PublishError> {
        self.send(record, origin).await?;
        tokio::time::sleep(self.pacing).await;
        Ok(())
    }

    async fn send(&self, record: &TransactionRecord, origin: Origin) -> Result<(), PublishError> {
        let payload = encode_record(record)?;

        let started = Instant::now();
        let result = self
            .transport
            .publish(&self.topic, &record.account, &payload, origin)
            .await;
        self.metrics
            .record_publish(&self.topic, started.elapsed().as_secs_f64(), result.is_ok());

        result
    }
}
