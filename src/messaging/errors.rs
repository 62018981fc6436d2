#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to create Kafka client: {0}")]
    Client(String),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Send to topic {topic} failed: {reason}")]
    Send { topic: String, reason: String },
}
