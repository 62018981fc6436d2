use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::record::TransactionRecord;

/// Every stored transaction in insertion order.
///
/// This is the typed stand-in for a full read of the `transactions` table. Row
/// position matters: "latest" always means last inserted, never latest by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTable {
    rows: Vec<TransactionRecord>,
}

impl TransactionTable {
    pub fn new(rows: Vec<TransactionRecord>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[TransactionRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<TransactionRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.rows.iter()
    }

    /// Distinct accounts in first-seen order.
    pub fn accounts(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|row| seen.insert(row.account.as_str()))
            .map(|row| row.account.clone())
            .collect()
    }

    /// Exact, case-sensitive match.
    pub fn contains_account(&self, account: &str) -> bool {
        self.rows.iter().any(|row| row.account == account)
    }

    /// Balance of the most recently inserted row for `account`.
    pub fn latest_balance(&self, account: &str) -> Option<Decimal> {
        self.rows
            .iter()
            .rev()
            .find(|row| row.account == account)
            .map(|row| row.balance)
    }

    /// Earliest and latest calendar date present, `None` for an empty table.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().map(|row| row.date.date());
        let first = dates.next()?;
        Some(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
    }
}

impl From<Vec<TransactionRecord>> for TransactionTable {
    fn from(rows: Vec<TransactionRecord>) -> Self {
        Self::new(rows)
    }
}

impl<'a> IntoIterator for &'a TransactionTable {
    type Item = &'a TransactionRecord;
    type IntoIter = std::slice::Iter<'a, TransactionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
