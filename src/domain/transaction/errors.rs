// ============================================================================
// Transaction Normalization Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Invalid transaction date '{0}': expected DD/MM/YYYY")]
    InvalidSourceDate(String),

    #[error("Invalid canonical date '{0}': expected YYYY-MM-DD HH:MM:SS")]
    InvalidCanonicalDate(String),

    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),

    #[error("Invalid decimal value '{0}'")]
    InvalidDecimal(String),
}
