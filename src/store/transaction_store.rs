use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::StoreConfig;
use crate::domain::transaction::{
    parse_canonical, to_money, NormalizeError, TransactionRecord, TransactionTable, TransactionType,
};
use crate::metrics::Metrics;

use super::errors::StoreError;

// ============================================================================
// Transaction Store - single SQLite table
// ============================================================================
//
// One connection per process, opened at startup and reused. Every statement
// autocommits. Rows are append-only and read back in insertion order (rowid).
//
// ============================================================================

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS transactions (
    transaction_date TEXT,
    account TEXT,
    transaction_value NUMERIC(10,2),
    balance NUMERIC(10,2),
    transaction_type TEXT
)";

const DROP_TABLE: &str = "DROP TABLE IF EXISTS transactions";

const INSERT_ROW: &str = "INSERT INTO transactions (
    transaction_date, account, transaction_value, balance, transaction_type
) VALUES (?, ?, ?, ?, ?)";

// NUMERIC affinity may store a value as INTEGER or REAL; casting to TEXT gives
// one representation to parse into Decimal.
const SELECT_ALL: &str = "SELECT transaction_date, account,
        CAST(transaction_value AS TEXT), CAST(balance AS TEXT), transaction_type
 FROM transactions
 ORDER BY rowid ASC";

type StoredRow = (String, String, String, String, String);

pub struct TransactionStore {
    pool: SqlitePool,
    metrics: Arc<Metrics>,
}

impl TransactionStore {
    /// Open the database (creating the file if needed) and make sure the
    /// table exists.
    pub async fn connect(config: &StoreConfig, metrics: Arc<Metrics>) -> Result<Self, StoreError> {
        let connect_error = |source: sqlx::Error| StoreError::Connect {
            url: config.database_url.clone(),
            source,
        };

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(connect_error)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(connect_error)?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        tracing::info!(url = %config.database_url, "Connection to SQLite store successful");

        Ok(Self { pool, metrics })
    }

    /// Drop and recreate the table. Every existing row is lost.
    pub async fn reset(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(DROP_TABLE).execute(&mut *tx).await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!("Recreated transactions table");
        Ok(())
    }

    /// Append one row. Single attempt; the caller decides what a failure means.
    ///
    /// Amounts are stored in cents, like the NUMERIC(10,2) columns declare.
    pub async fn insert(&self, record: &TransactionRecord) -> Result<(), StoreError> {
        let result = sqlx::query(INSERT_ROW)
            .bind(record.canonical_date())
            .bind(&record.account)
            .bind(to_money(record.amount).to_string())
            .bind(to_money(record.balance).to_string())
            .bind(record.transaction_type.as_str())
            .execute(&self.pool)
            .await;

        self.metrics.record_insert(result.is_ok());

        match result {
            Ok(_) => {
                tracing::debug!(
                    account = %record.account,
                    transaction_type = %record.transaction_type,
                    amount = %record.amount,
                    "Inserted transaction"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, account = %record.account, "Failed to insert transaction");
                Err(e.into())
            }
        }
    }

    /// Every row in insertion order, or the error that prevented reading it.
    pub async fn try_query_all(&self) -> Result<TransactionTable, StoreError> {
        let rows: Vec<StoredRow> = sqlx::query_as(SELECT_ALL).fetch_all(&self.pool).await?;

        let records = rows
            .into_iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionTable::new(records))
    }

    /// Every row in insertion order.
    ///
    /// A failed read is reported as an empty table, so "no data" and "store
    /// unavailable" look the same to callers. The failure is logged and counted
    /// in `query_failures_total`; use `try_query_all` to tell them apart.
    pub async fn query_all(&self) -> TransactionTable {
        match self.try_query_all().await {
            Ok(table) => table,
            Err(e) => {
                self.metrics.query_failures.inc();
                tracing::warn!(error = %e, "Failed to read transactions, returning an empty table");
                TransactionTable::empty()
            }
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn decode_row(row: StoredRow) -> Result<TransactionRecord, NormalizeError> {
    let (date, account, amount, balance, transaction_type) = row;

    Ok(TransactionRecord::new(
        parse_canonical(&date)?,
        account,
        parse_stored_decimal(&amount)?,
        parse_stored_decimal(&balance)?,
        TransactionType::from_str(&transaction_type)?,
    ))
}

fn parse_stored_decimal(raw: &str) -> Result<Decimal, NormalizeError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| NormalizeError::InvalidDecimal(raw.to_string()))
}
