// ============================================================================
// Ingest - Bulk Import & Normalization
// ============================================================================
//
// CSV rows -> RawTransaction (signed value, DD/MM/YYYY date)
//          -> TransactionRecord (magnitude, direction, canonical date)
//
// ============================================================================

mod csv_source;
mod errors;
mod normalizer;

pub use csv_source::{load_records, read_raw_transactions, CsvRow};
pub use errors::ImportError;
pub use normalizer::{
    classify, normalize, normalize_all, normalize_amount, normalize_date, parse_source_date,
    RawTransaction,
};
