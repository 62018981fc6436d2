use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::NormalizeError;

// ============================================================================
// Transaction Value Objects
// ============================================================================

/// Timestamp layout shared by the topic, the SQL table and the dashboard.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decimal places kept for money, as in the NUMERIC(10,2) columns.
pub const MONEY_SCALE: u32 = 2;

/// Largest single transaction amount: 99 999 999.99
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999, MONEY_SCALE)
}

/// Largest balance magnitude that survives SQLite's REAL storage exactly
/// (15 significant digits): 9 999 999 999 999.99
pub fn max_balance() -> Decimal {
    Decimal::new(999_999_999_999_999, MONEY_SCALE)
}

/// Round to cents.
pub fn to_money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_SCALE)
}

/// Direction of a transaction. The amount is always a magnitude; the sign
/// lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Deposit, TransactionType::Withdrawal];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
        }
    }

    /// Balance after applying `amount` in this direction. No floor at zero.
    /// `None` when the result overflows or leaves the storable balance range.
    pub fn apply(&self, balance: Decimal, amount: Decimal) -> Option<Decimal> {
        let next = match self {
            TransactionType::Deposit => balance.checked_add(amount),
            TransactionType::Withdrawal => balance.checked_sub(amount),
        }?;

        (next.abs() <= max_balance()).then_some(next)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            other => Err(NormalizeError::UnknownTransactionType(other.to_string())),
        }
    }
}

pub fn format_canonical(date: &NaiveDateTime) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

pub fn parse_canonical(raw: &str) -> Result<NaiveDateTime, NormalizeError> {
    NaiveDateTime::parse_from_str(raw.trim(), CANONICAL_DATE_FORMAT)
        .map_err(|_| NormalizeError::InvalidCanonicalDate(raw.to_string()))
}

/// Serde adapter writing dates as `YYYY-MM-DD HH:MM:SS` strings.
pub mod canonical_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_canonical(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_canonical(&raw).map_err(serde::de::Error::custom)
    }
}
