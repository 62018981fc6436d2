use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::domain::transaction::{TransactionRecord, TransactionTable};
use crate::errors::{ErrorPolicy, PipelineError};
use crate::messaging::{EventPublisher, Origin, Publisher};
use crate::metrics::Metrics;
use crate::store::TransactionStore;

use super::state::{transition, EntryEvent, EntryState, Transition};

// ============================================================================
// Entry Session
// ============================================================================
//
// Owns the form state and the last table read. A recorded transition is
// published first (failure aborts, state unchanged), then inserted (failure is
// logged), then the table is re-read so the screen shows the stored balance.
//
// ============================================================================

pub struct EntrySession<P: Publisher> {
    state: EntryState,
    table: TransactionTable,
    publisher: EventPublisher<P>,
    store: Arc<TransactionStore>,
    metrics: Arc<Metrics>,
}

impl<P: Publisher> EntrySession<P> {
    pub async fn start(publisher: EventPublisher<P>, store: Arc<TransactionStore>, metrics: Arc<Metrics>) -> Self {
        let table = store.query_all().await;
        Self {
            state: EntryState::AccountSelection,
            table,
            publisher,
            store,
            metrics,
        }
    }

    pub fn state(&self) -> &EntryState {
        &self.state
    }

    pub fn table(&self) -> &TransactionTable {
        &self.table
    }

    pub fn publisher(&self) -> &EventPublisher<P> {
        &self.publisher
    }

    /// Apply `event` stamped with the local wall-clock time.
    pub async fn dispatch(&mut self, event: EntryEvent) -> Result<Option<TransactionRecord>, PipelineError> {
        self.dispatch_at(event, Local::now().naive_local()).await
    }

    pub async fn dispatch_at(
        &mut self,
        event: EntryEvent,
        now: NaiveDateTime,
    ) -> Result<Option<TransactionRecord>, PipelineError> {
        let (next, record) = match transition(&self.state, event, &self.table, now) {
            Transition::Moved(next) => (next, None),
            Transition::Recorded { next, record } => {
                self.persist(&record).await?;
                (next, Some(record))
            }
            Transition::Rejected { reason } => return Err(PipelineError::Validation(reason)),
        };

        self.state = next;
        self.refresh().await;

        Ok(record)
    }

    async fn persist(&self, record: &TransactionRecord) -> Result<(), PipelineError> {
        tracing::info!(
            account = %record.account,
            transaction_type = %record.transaction_type,
            amount = %record.amount,
            date = %record.canonical_date(),
            new_balance = %record.balance,
            "Recording manual transaction"
        );

        self.publisher.publish_one(record, Origin::Entry).await?;
        self.metrics.record_manual_entry(record.transaction_type.as_str());

        if let Err(e) = self.store.insert(record).await {
            let error = PipelineError::from(e);
            match error.policy() {
                ErrorPolicy::LogAndContinue => {
                    tracing::warn!(error = %error, "Transaction published but not stored");
                }
                _ => return Err(error),
            }
        }

        Ok(())
    }

    async fn refresh(&mut self) {
        self.table = self.store.query_all().await;
        self.state = std::mem::replace(&mut self.state, EntryState::AccountSelection).refreshed(&self.table);
    }
}
