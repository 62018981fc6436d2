use std::io;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::transaction::{NormalizeError, TransactionRecord};

use super::errors::ImportError;
use super::normalizer::{normalize, RawTransaction};

/// One line of the semicolon-delimited import file.
///
/// Numbers are kept as text here and parsed into `Decimal` explicitly, so a
/// value like `0.1` never goes through a float.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CsvRow {
    pub transaction_date: String,
    pub account: String,
    pub transaction_value: String,
    pub balance: String,
}

impl CsvRow {
    pub fn into_raw(self) -> Result<RawTransaction, NormalizeError> {
        Ok(RawTransaction {
            transaction_value: parse_decimal(&self.transaction_value)?,
            balance: parse_decimal(&self.balance)?,
            transaction_date: self.transaction_date,
            account: self.account,
        })
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, NormalizeError> {
    Decimal::from_str(raw.trim()).map_err(|_| NormalizeError::InvalidDecimal(raw.to_string()))
}

/// Read every row of an import file. Line numbers in errors are 1-based and
/// count the header.
pub fn read_raw_transactions<R: io::Read>(reader: R) -> Result<Vec<RawTransaction>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.map_err(|source| ImportError::Row { line, source })?;
        let raw = row
            .into_raw()
            .map_err(|source| ImportError::Normalize { line, source })?;
        rows.push(raw);
    }

    Ok(rows)
}

/// Load and normalize at most `limit` rows from the file at `path`.
pub fn load_records(path: &Path, limit: usize) -> Result<Vec<TransactionRecord>, ImportError> {
    let file = std::fs::File::open(path).map_err(|e| ImportError::Open {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;

    let raw_rows = read_raw_transactions(file)?;

    let records = raw_rows
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, raw)| {
            normalize(raw).map_err(|source| ImportError::Normalize { line: index + 2, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        path = %path.display(),
        total_rows = raw_rows.len(),
        loaded = records.len(),
        "Loaded transactions from CSV"
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TransactionType;
    use std::io::Write;

    const SAMPLE: &str = "\
transaction_date;account;transaction_value;balance
03/01/2024;FR-001;1500.00;1500.00
04/01/2024;FR-001;-200.50;1299.50
04/01/2024;FR-002;0;80.00
";

    #[test]
    fn test_reads_semicolon_rows() {
        let rows = read_raw_transactions(SAMPLE.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].account, "FR-001");
        assert_eq!(rows[1].transaction_value, "-200.50".parse().unwrap());
        assert_eq!(rows[2].transaction_value, Decimal::ZERO);
    }

    #[test]
    fn test_bad_amount_reports_line() {
        let input = "transaction_date;account;transaction_value;balance\n03/01/2024;FR-001;abc;1.00\n";
        let error = read_raw_transactions(input.as_bytes()).unwrap_err();

        assert!(matches!(error, ImportError::Normalize { line: 2, .. }));
    }

    #[test]
    fn test_missing_column_is_a_row_error() {
        let input = "transaction_date;account;transaction_value\n03/01/2024;FR-001;12\n";
        let error = read_raw_transactions(input.as_bytes()).unwrap_err();

        assert!(matches!(error, ImportError::Row { line: 2, .. }));
    }

    #[test]
    fn test_load_records_respects_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let records = load_records(file.path(), 2).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].transaction_type, TransactionType::Deposit);
        assert_eq!(records[1].transaction_type, TransactionType::Withdrawal);
        assert_eq!(records[1].amount, "200.50".parse().unwrap());
        assert_eq!(records[1].canonical_date(), "2024-01-04 00:00:00");
    }

    #[test]
    fn test_load_records_missing_file() {
        let error = load_records(Path::new("does/not/exist.csv"), 5).unwrap_err();
        assert!(matches!(error, ImportError::Open { .. }));
    }
}
