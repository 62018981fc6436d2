use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use super::errors::PublishError;
use super::redpanda::{Origin, Publisher};

#[derive(Debug, Clone)]
pub(crate) struct SentMessage {
    pub topic: String,
    pub key: String,
    pub payload: String,
    pub origin: Origin,
    pub sent_at: Instant,
}

/// In-memory publisher recording every send. Fails the send whose zero-based
/// index equals `fail_at`.
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    sent: Mutex<Vec<SentMessage>>,
    attempts: Mutex<usize>,
    fail_at: Option<usize>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str, origin: Origin) -> Result<(), PublishError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let current = *attempts;
            *attempts += 1;
            current
        };

        if self.fail_at == Some(attempt) {
            return Err(PublishError::Send {
                topic: topic.to_string(),
                reason: "broker unavailable".to_string(),
            });
        }

        self.sent.lock().unwrap().push(SentMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_string(),
            origin,
            sent_at: Instant::now(),
        });
        Ok(())
    }
}
