use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::value_objects::{format_canonical, TransactionType};

// ============================================================================
// Transaction Record - the canonical shape
// ============================================================================
//
// Created by bulk import or by a manual entry, published to the topic, then
// appended to the store. Records are never updated or deleted.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub date: NaiveDateTime,
    pub account: String,
    /// Magnitude only, direction is carried by `transaction_type`
    pub amount: Decimal,
    /// Running balance of the account after this transaction
    pub balance: Decimal,
    pub transaction_type: TransactionType,
}

impl TransactionRecord {
    pub fn new(
        date: NaiveDateTime,
        account: impl Into<String>,
        amount: Decimal,
        balance: Decimal,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            date,
            account: account.into(),
            amount,
            balance,
            transaction_type,
        }
    }

    /// Build the record for a manual entry applied on top of `current_balance`.
    /// `None` when the new balance would be out of range.
    pub fn applied_to(
        account: impl Into<String>,
        current_balance: Decimal,
        amount: Decimal,
        transaction_type: TransactionType,
        date: NaiveDateTime,
    ) -> Option<Self> {
        let balance = transaction_type.apply(current_balance, amount)?;
        Some(Self::new(date, account, amount, balance, transaction_type))
    }

    pub fn canonical_date(&self) -> String {
        format_canonical(&self.date)
    }
}
