use crate::ingest::ImportError;
use crate::messaging::PublishError;
use crate::store::StoreError;

// ============================================================================
// Pipeline Error Taxonomy
// ============================================================================
//
// Module errors are folded into one enum at the process boundary so that each
// kind gets an explicit handling policy.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Store or broker unreachable
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Malformed manual input
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(PublishError),

    #[error("Storage error: {0}")]
    Storage(StoreError),

    /// Wire JSON could not be written or read
    #[error("Codec error: {0}")]
    Codec(serde_json::Error),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),
}

/// What the caller does with an error of a given kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop the current batch or process
    Abort,
    /// Drop silently, nothing is produced
    Ignore,
    /// Log it and keep going
    LogAndContinue,
}

impl PipelineError {
    pub fn policy(&self) -> ErrorPolicy {
        match self {
            PipelineError::Connectivity(_) => ErrorPolicy::Abort,
            PipelineError::Validation(_) => ErrorPolicy::Ignore,
            PipelineError::Transport(_) => ErrorPolicy::Abort,
            PipelineError::Storage(_) => ErrorPolicy::LogAndContinue,
            PipelineError::Codec(_) => ErrorPolicy::Abort,
            PipelineError::Import(_) => ErrorPolicy::Abort,
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Connect { .. } => PipelineError::Connectivity(error.to_string()),
            other => PipelineError::Storage(other),
        }
    }
}

impl From<PublishError> for PipelineError {
    fn from(error: PublishError) -> Self {
        match error {
            PublishError::Client(_) => PipelineError::Connectivity(error.to_string()),
            PublishError::Encode(e) => PipelineError::Codec(e),
            other => PipelineError::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policies_per_kind() {
        let transport: PipelineError = PublishError::Send {
            topic: "t".to_string(),
            reason: "broker down".to_string(),
        }
        .into();
        assert_eq!(transport.policy(), ErrorPolicy::Abort);

        let client: PipelineError = PublishError::Client("bad config".to_string()).into();
        assert!(matches!(client, PipelineError::Connectivity(_)));

        let storage: PipelineError = StoreError::Query(sqlx::Error::RowNotFound).into();
        assert_eq!(storage.policy(), ErrorPolicy::LogAndContinue);

        assert_eq!(PipelineError::Validation("abc".into()).policy(), ErrorPolicy::Ignore);
    }

    #[test]
    fn test_wire_errors_are_codec() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let codec: PipelineError = PublishError::Encode(json_error).into();

        assert!(matches!(codec, PipelineError::Codec(_)));
        assert_eq!(codec.policy(), ErrorPolicy::Abort);
    }
}
