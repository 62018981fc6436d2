use std::path::PathBuf;

use crate::domain::transaction::NormalizeError;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to open import file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed CSV row at line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid value at line {line}: {source}")]
    Normalize {
        line: usize,
        #[source]
        source: NormalizeError,
    },
}
