use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::domain::transaction::{format_canonical, to_money, NormalizeError, TransactionRecord, TransactionType};

/// A bulk import row before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransaction {
    /// Day-first date, e.g. `31/01/2024`
    pub transaction_date: String,
    pub account: String,
    /// Signed: positive is money in, zero or negative is money out
    pub transaction_value: Decimal,
    pub balance: Decimal,
}

const SOURCE_DATETIME_FORMATS: [&str; 2] = ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];
const SOURCE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Strictly positive values are deposits. Zero counts as a withdrawal.
pub fn classify(value: Decimal) -> TransactionType {
    if value > Decimal::ZERO {
        TransactionType::Deposit
    } else {
        TransactionType::Withdrawal
    }
}

pub fn normalize_amount(value: Decimal) -> Decimal {
    value.abs()
}

/// Parse a day/month/year date, with an optional time of day. Missing time
/// means midnight.
pub fn parse_source_date(raw: &str) -> Result<NaiveDateTime, NormalizeError> {
    let raw = raw.trim();

    for format in SOURCE_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(datetime);
        }
    }

    NaiveDate::parse_from_str(raw, SOURCE_DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| NormalizeError::InvalidSourceDate(raw.to_string()))
}

/// `DD/MM/YYYY` -> `YYYY-MM-DD HH:MM:SS`
pub fn normalize_date(raw: &str) -> Result<String, NormalizeError> {
    parse_source_date(raw).map(|datetime| format_canonical(&datetime))
}

/// Amount and balance are rounded to cents; the sign is read before rounding.
pub fn normalize(raw: &RawTransaction) -> Result<TransactionRecord, NormalizeError> {
    Ok(TransactionRecord::new(
        parse_source_date(&raw.transaction_date)?,
        raw.account.trim(),
        to_money(normalize_amount(raw.transaction_value)),
        to_money(raw.balance),
        classify(raw.transaction_value),
    ))
}

/// Normalize every row, stopping at the first bad one. The error carries the
/// zero-based row index.
pub fn normalize_all(rows: &[RawTransaction]) -> Result<Vec<TransactionRecord>, (usize, NormalizeError)> {
    rows.iter()
        .enumerate()
        .map(|(index, raw)| normalize(raw).map_err(|e| (index, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn raw(date: &str, value: &str) -> RawTransaction {
        RawTransaction {
            transaction_date: date.to_string(),
            account: " FR-001 ".to_string(),
            transaction_value: dec(value),
            balance: dec("250.00"),
        }
    }

    #[test]
    fn test_classify_by_sign() {
        assert_eq!(classify(dec("0.01")), TransactionType::Deposit);
        assert_eq!(classify(dec("1200")), TransactionType::Deposit);
        assert_eq!(classify(dec("-0.01")), TransactionType::Withdrawal);
        assert_eq!(classify(dec("-75.5")), TransactionType::Withdrawal);
    }

    #[test]
    fn test_zero_is_a_withdrawal() {
        assert_eq!(classify(Decimal::ZERO), TransactionType::Withdrawal);
        assert_eq!(classify(dec("0.00")), TransactionType::Withdrawal);
    }

    #[test]
    fn test_normalize_amount_is_absolute_value() {
        for value in ["-75.50", "75.50", "0", "-0.01", "1000000"] {
            assert_eq!(normalize_amount(dec(value)), dec(value).abs());
            assert!(normalize_amount(dec(value)) >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_normalize_date_defaults_to_midnight() {
        assert_eq!(normalize_date("31/01/2024").unwrap(), "2024-01-31 00:00:00");
        assert_eq!(normalize_date("01/12/1999").unwrap(), "1999-12-01 00:00:00");
        assert_eq!(normalize_date(" 5/3/2023 ").unwrap(), "2023-03-05 00:00:00");
    }

    #[test]
    fn test_normalize_date_keeps_time_when_present() {
        assert_eq!(normalize_date("31/01/2024 14:30:05").unwrap(), "2024-01-31 14:30:05");
        assert_eq!(normalize_date("31/01/2024 14:30").unwrap(), "2024-01-31 14:30:00");
    }

    #[test]
    fn test_normalize_date_rejects_other_layouts() {
        assert!(normalize_date("2024-01-31").is_err());
        assert!(normalize_date("31/13/2024").is_err());
        assert!(normalize_date("").is_err());
    }

    #[test]
    fn test_normalize_builds_canonical_record() {
        let record = normalize(&raw("15/02/2024", "-42.10")).unwrap();

        assert_eq!(record.canonical_date(), "2024-02-15 00:00:00");
        assert_eq!(record.account, "FR-001");
        assert_eq!(record.amount, dec("42.10"));
        assert_eq!(record.balance, dec("250.00"));
        assert_eq!(record.transaction_type, TransactionType::Withdrawal);
    }

    #[test]
    fn test_normalize_rounds_to_cents() {
        let mut row = raw("15/02/2024", "12.346");
        row.balance = dec("0.123456789012345678");

        let record = normalize(&row).unwrap();

        assert_eq!(record.amount, dec("12.35"));
        assert_eq!(record.balance, dec("0.12"));
        assert_eq!(record.transaction_type, TransactionType::Deposit);
    }

    #[test]
    fn test_normalize_all_reports_failing_row() {
        let rows = vec![raw("01/01/2024", "10"), raw("not a date", "10")];
        let (index, error) = normalize_all(&rows).unwrap_err();

        assert_eq!(index, 1);
        assert!(matches!(error, NormalizeError::InvalidSourceDate(_)));
    }
}
