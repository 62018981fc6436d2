use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::domain::transaction::{max_amount, TransactionRecord, TransactionTable, TransactionType, MONEY_SCALE};

/// Screen of the entry form, with whatever it needs to render.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryState {
    /// Initial screen: pick one of the known accounts
    AccountSelection,
    /// Enter deposits and withdrawals for `account`
    TransactionEntry { account: String, balance: Decimal },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryEvent {
    SelectAccount(String),
    /// `amount` is the raw text typed by the user
    Submit { direction: TransactionType, amount: String },
    Back,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Move to (or stay on) a screen, nothing is produced
    Moved(EntryState),
    /// A valid submission produced a record to publish and store
    Recorded { next: EntryState, record: TransactionRecord },
    /// Input was malformed; the state does not change
    Rejected { reason: String },
}

impl Transition {
    pub fn record(&self) -> Option<&TransactionRecord> {
        match self {
            Transition::Recorded { record, .. } => Some(record),
            _ => None,
        }
    }
}

/// Strictly positive number in whole cents, no larger than `max_amount()`.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
        .filter(|amount| *amount > Decimal::ZERO && *amount <= max_amount())
        .filter(|amount| amount.normalize().scale() <= MONEY_SCALE)
}

pub fn validate_amount(text: &str) -> bool {
    parse_amount(text).is_some()
}

impl EntryState {
    /// Pick up the latest stored balance after the table was re-read.
    pub fn refreshed(self, table: &TransactionTable) -> Self {
        match self {
            EntryState::TransactionEntry { account, balance } => {
                let balance = table.latest_balance(&account).unwrap_or(balance);
                EntryState::TransactionEntry { account, balance }
            }
            other => other,
        }
    }
}

/// Next state for `event`, given the last table read and the current time.
pub fn transition(state: &EntryState, event: EntryEvent, table: &TransactionTable, now: NaiveDateTime) -> Transition {
    match (state, event) {
        (EntryState::AccountSelection, EntryEvent::SelectAccount(account)) => {
            match table.latest_balance(&account) {
                Some(balance) => Transition::Moved(EntryState::TransactionEntry { account, balance }),
                None => Transition::Moved(EntryState::AccountSelection),
            }
        }

        (EntryState::TransactionEntry { account, balance }, EntryEvent::Submit { direction, amount }) => {
            let Some(amount) = parse_amount(&amount) else {
                return Transition::Rejected {
                    reason: format!("not a positive amount: {:?}", amount),
                };
            };

            let Some(record) = TransactionRecord::applied_to(account.clone(), *balance, amount, direction, now) else {
                return Transition::Rejected {
                    reason: format!("{} of {} takes the balance out of range", direction, amount),
                };
            };

            Transition::Recorded {
                next: EntryState::TransactionEntry {
                    account: account.clone(),
                    balance: record.balance,
                },
                record,
            }
        }

        (EntryState::TransactionEntry { .. }, EntryEvent::Back) => Transition::Moved(EntryState::AccountSelection),

        (current, _) => Transition::Moved(current.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(14, 0, 0).unwrap()
    }

    fn table() -> TransactionTable {
        TransactionTable::new(vec![
            TransactionRecord::new(now(), "FR-001", dec("100"), dec("100.00"), TransactionType::Deposit),
            TransactionRecord::new(now(), "FR-002", dec("5"), dec("20.00"), TransactionType::Deposit),
        ])
    }

    fn entry(balance: &str) -> EntryState {
        EntryState::TransactionEntry {
            account: "FR-001".to_string(),
            balance: dec(balance),
        }
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("50"));
        assert!(validate_amount("0.01"));
        assert!(validate_amount(" 12.5 "));
        assert!(validate_amount("1e3"));
        assert!(!validate_amount("-5"));
        assert!(!validate_amount("0"));
        assert!(!validate_amount("abc"));
        assert!(!validate_amount(""));
    }

    #[test]
    fn test_validate_amount_bounds() {
        assert!(validate_amount("99999999.99"));
        assert!(validate_amount("12.500"));
        assert!(!validate_amount("100000000"));
        assert!(!validate_amount("0.001"));
        assert!(!validate_amount("0.123456789012345678"));
        assert!(!validate_amount("79228162514264337593543950335"));
    }

    #[test]
    fn test_select_known_account_shows_its_balance() {
        let t = transition(&EntryState::AccountSelection, EntryEvent::SelectAccount("FR-001".into()), &table(), now());
        assert_eq!(t, Transition::Moved(entry("100.00")));
    }

    #[test]
    fn test_select_requires_exact_match() {
        for candidate in ["fr-001", "FR-00", " FR-001", "FR-999"] {
            let t = transition(&EntryState::AccountSelection, EntryEvent::SelectAccount(candidate.into()), &table(), now());
            assert_eq!(t, Transition::Moved(EntryState::AccountSelection));
        }
    }

    #[test]
    fn test_deposit_produces_record() {
        let t = transition(
            &entry("100.00"),
            EntryEvent::Submit { direction: TransactionType::Deposit, amount: "50.00".into() },
            &table(),
            now(),
        );

        let record = t.record().unwrap();
        assert_eq!(record.balance, dec("150.00"));
        assert_eq!(record.amount, dec("50.00"));
        assert_eq!(record.transaction_type, TransactionType::Deposit);
        assert_eq!(record.account, "FR-001");
        assert_eq!(record.date, now());
        assert!(matches!(t, Transition::Recorded { next, .. } if next == entry("150.00")));
    }

    #[test]
    fn test_withdrawal_produces_record() {
        let t = transition(
            &entry("100.00"),
            EntryEvent::Submit { direction: TransactionType::Withdrawal, amount: "30.00".into() },
            &table(),
            now(),
        );

        let record = t.record().unwrap();
        assert_eq!(record.balance, dec("70.00"));
        assert_eq!(record.transaction_type, TransactionType::Withdrawal);
    }

    #[test]
    fn test_withdrawal_may_overdraw() {
        let t = transition(
            &entry("10.00"),
            EntryEvent::Submit { direction: TransactionType::Withdrawal, amount: "25".into() },
            &table(),
            now(),
        );
        assert_eq!(t.record().unwrap().balance, dec("-15.00"));
    }

    #[test]
    fn test_invalid_amount_is_rejected_without_record() {
        for text in ["-5", "abc", "0"] {
            let t = transition(
                &entry("100.00"),
                EntryEvent::Submit { direction: TransactionType::Deposit, amount: text.into() },
                &table(),
                now(),
            );
            assert!(matches!(t, Transition::Rejected { .. }));
            assert!(t.record().is_none());
        }
    }

    #[test]
    fn test_oversized_amount_is_rejected_without_panicking() {
        let t = transition(
            &entry("100.00"),
            EntryEvent::Submit { direction: TransactionType::Deposit, amount: "79228162514264337593543950335".into() },
            &table(),
            now(),
        );
        assert!(matches!(t, Transition::Rejected { .. }));
    }

    #[test]
    fn test_balance_out_of_range_is_rejected() {
        let t = transition(
            &entry("9999999999999.99"),
            EntryEvent::Submit { direction: TransactionType::Deposit, amount: "0.01".into() },
            &table(),
            now(),
        );
        assert!(matches!(t, Transition::Rejected { .. }));

        let t = transition(
            &entry("-9999999999999.99"),
            EntryEvent::Submit { direction: TransactionType::Withdrawal, amount: "99999999.99".into() },
            &table(),
            now(),
        );
        assert!(matches!(t, Transition::Rejected { .. }));
    }

    #[test]
    fn test_back_always_returns_to_selection() {
        let t = transition(&entry("100.00"), EntryEvent::Back, &table(), now());
        assert_eq!(t, Transition::Moved(EntryState::AccountSelection));
    }

    #[test]
    fn test_events_for_the_other_screen_are_ignored() {
        let submit = EntryEvent::Submit { direction: TransactionType::Deposit, amount: "5".into() };
        assert_eq!(
            transition(&EntryState::AccountSelection, submit, &table(), now()),
            Transition::Moved(EntryState::AccountSelection)
        );
        assert_eq!(
            transition(&entry("1"), EntryEvent::SelectAccount("FR-002".into()), &table(), now()),
            Transition::Moved(entry("1"))
        );
    }

    #[test]
    fn test_refreshed_takes_latest_stored_balance() {
        assert_eq!(entry("1").refreshed(&table()), entry("100.00"));
        assert_eq!(EntryState::AccountSelection.refreshed(&table()), EntryState::AccountSelection);
        // No stored row yet: keep what we have.
        assert_eq!(entry("7").refreshed(&TransactionTable::empty()), entry("7"));
    }
}
