use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::transaction::{canonical_date, TransactionRecord, TransactionType};

/// One topic message. Field order and names are the topic contract:
/// `{"transaction_date", "account", "transaction_value", "balance", "transaction_type"}`
/// with decimals written as JSON numbers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TransactionMessage {
    #[serde(with = "canonical_date")]
    pub transaction_date: NaiveDateTime,
    pub account: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub transaction_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub transaction_type: TransactionType,
}

impl From<&TransactionRecord> for TransactionMessage {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            transaction_date: record.date,
            account: record.account.clone(),
            transaction_value: record.amount,
            balance: record.balance,
            transaction_type: record.transaction_type,
        }
    }
}

impl From<TransactionMessage> for TransactionRecord {
    fn from(message: TransactionMessage) -> Self {
        TransactionRecord::new(
            message.transaction_date,
            message.account,
            message.transaction_value,
            message.balance,
            message.transaction_type,
        )
    }
}

pub fn encode_record(record: &TransactionRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(&TransactionMessage::from(record))
}

pub fn decode_record(payload: &[u8]) -> Result<TransactionRecord, serde_json::Error> {
    serde_json::from_slice::<TransactionMessage>(payload).map(TransactionRecord::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn sample() -> TransactionRecord {
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            "FR-001",
            "200.5".parse().unwrap(),
            "1299.5".parse().unwrap(),
            TransactionType::Withdrawal,
        )
    }

    #[test]
    fn test_encoded_message_matches_topic_contract() {
        let json = encode_record(&sample()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 5);
        assert_eq!(object["transaction_date"], "2024-01-04 00:00:00");
        assert_eq!(object["account"], "FR-001");
        assert_eq!(object["transaction_value"].as_f64(), Some(200.5));
        assert_eq!(object["balance"].as_f64(), Some(1299.5));
        assert_eq!(object["transaction_type"], "withdrawal");
    }

    #[test]
    fn test_keys_are_written_in_schema_order() {
        let json = encode_record(&sample()).unwrap();
        let positions: Vec<usize> = ["transaction_date", "account", "transaction_value", "balance", "transaction_type"]
            .iter()
            .map(|key| json.find(&format!("\"{}\"", key)).unwrap())
            .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let payload = br#"{"transaction_date":"2024-01-04 00:00:00","account":"A","transaction_value":1.0,"balance":1.0,"transaction_type":"refund"}"#;
        assert!(decode_record(payload).is_err());
    }

    #[test]
    fn test_decode_accepts_producer_output() {
        let payload = encode_record(&sample()).unwrap();
        assert_eq!(decode_record(payload.as_bytes()).unwrap(), sample());
    }
}
