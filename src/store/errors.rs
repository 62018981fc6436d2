use crate::domain::transaction::NormalizeError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Corrupt row in transactions table: {0}")]
    Decode(#[from] NormalizeError),
}
