use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::transaction::{TransactionTable, TransactionType};

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Fill missing bounds with the observed min/max date. `None` when a bound
    /// is missing and the table is empty.
    pub fn resolve(table: &TransactionTable, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        let bounds = table.date_bounds();
        Some(Self {
            start: start.or(bounds.map(|(min, _)| min))?,
            end: end.or(bounds.map(|(_, max)| max))?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub deposit: u64,
    pub withdrawal: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub deposit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub withdrawal: Decimal,
}

impl TypeTotals {
    pub fn total(&self) -> Decimal {
        self.deposit.saturating_add(self.withdrawal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    /// Position of the row in the full table
    pub index: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// Rows whose calendar date falls in `range`, in table order.
pub fn filter_by_date(table: &TransactionTable, range: &DateRange) -> TransactionTable {
    table
        .iter()
        .filter(|row| range.contains(row.date.date()))
        .cloned()
        .collect::<Vec<_>>()
        .into()
}

/// Number of transactions per account and direction, accounts sorted.
pub fn count_matrix(table: &TransactionTable) -> BTreeMap<String, TypeCounts> {
    let mut matrix: BTreeMap<String, TypeCounts> = BTreeMap::new();
    for row in table {
        let counts = matrix.entry(row.account.clone()).or_default();
        match row.transaction_type {
            TransactionType::Deposit => counts.deposit += 1,
            TransactionType::Withdrawal => counts.withdrawal += 1,
        }
    }
    matrix
}

/// Sum of amounts per account and direction, accounts sorted. Sums clamp at
/// the `Decimal` bounds instead of overflowing.
pub fn totals_by_account(table: &TransactionTable) -> BTreeMap<String, TypeTotals> {
    let mut totals: BTreeMap<String, TypeTotals> = BTreeMap::new();
    for row in table {
        let entry = totals.entry(row.account.clone()).or_default();
        let sum = match row.transaction_type {
            TransactionType::Deposit => &mut entry.deposit,
            TransactionType::Withdrawal => &mut entry.withdrawal,
        };
        *sum = sum.saturating_add(row.amount);
    }
    totals
}

/// Balance of `account` against row index, not against time.
pub fn balance_series(table: &TransactionTable, account: &str) -> Vec<BalancePoint> {
    table
        .iter()
        .enumerate()
        .filter(|(_, row)| row.account == account)
        .map(|(index, row)| BalancePoint {
            index,
            balance: row.balance,
        })
        .collect()
}
