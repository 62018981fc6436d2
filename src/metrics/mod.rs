// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

pub use server::{metrics_handler, spawn_metrics_server, start_metrics_server};

// ============================================================================
// Metrics Module - Prometheus metrics for the pipeline
// ============================================================================
//
// Counts what each stage did:
// - Topic publishes (successes, failures, send latency)
// - Store inserts and degraded reads
// - Manual entries per direction
// - Sink outcomes per consumed message
//
// Each process owns one registry, scraped via /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Publisher
    pub records_published: IntCounter,
    pub publish_failures: IntCounter,
    pub publish_duration: HistogramVec,

    // Store
    pub rows_inserted: IntCounter,
    pub insert_failures: IntCounter,
    pub query_failures: IntCounter,

    // Front ends
    pub manual_entries: IntCounterVec,
    pub sink_messages: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let records_published = IntCounter::new(
            "records_published_total",
            "Transaction records sent to the topic",
        )?;
        registry.register(Box::new(records_published.clone()))?;

        let publish_failures = IntCounter::new(
            "publish_failures_total",
            "Sends that failed and aborted their batch",
        )?;
        registry.register(Box::new(publish_failures.clone()))?;

        let publish_duration = HistogramVec::new(
            HistogramOpts::new("publish_duration_seconds", "Time spent in a single topic send")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["topic"],
        )?;
        registry.register(Box::new(publish_duration.clone()))?;

        let rows_inserted = IntCounter::new("rows_inserted_total", "Rows appended to the transactions table")?;
        registry.register(Box::new(rows_inserted.clone()))?;

        let insert_failures = IntCounter::new("insert_failures_total", "Inserts that failed")?;
        registry.register(Box::new(insert_failures.clone()))?;

        let query_failures = IntCounter::new(
            "query_failures_total",
            "Full-table reads that failed and were reported as empty",
        )?;
        registry.register(Box::new(query_failures.clone()))?;

        let manual_entries = IntCounterVec::new(
            Opts::new("manual_entries_total", "Transactions entered through the entry form"),
            &["transaction_type"],
        )?;
        registry.register(Box::new(manual_entries.clone()))?;

        let sink_messages = IntCounterVec::new(
            Opts::new("sink_messages_total", "Messages consumed by the topic sink"),
            &["outcome"],
        )?;
        registry.register(Box::new(sink_messages.clone()))?;

        Ok(Self {
            registry,
            records_published,
            publish_failures,
            publish_duration,
            rows_inserted,
            insert_failures,
            query_failures,
            manual_entries,
            sink_messages,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_publish(&self, topic: &str, duration_secs: f64, success: bool) {
        if success {
            self.records_published.inc();
        } else {
            self.publish_failures.inc();
        }
        self.publish_duration.with_label_values(&[topic]).observe(duration_secs);
    }

    pub fn record_insert(&self, success: bool) {
        if success {
            self.rows_inserted.inc();
        } else {
            self.insert_failures.inc();
        }
    }

    pub fn record_manual_entry(&self, transaction_type: &str) {
        self.manual_entries.with_label_values(&[transaction_type]).inc();
    }

    pub fn record_sink_outcome(&self, outcome: &str) {
        self.sink_messages.with_label_values(&[outcome]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(!metrics.registry.gather().is_empty());
    }

    #[test]
    fn test_record_publish() {
        let metrics = Metrics::new().unwrap();
        metrics.record_publish("ProjectBigData", 0.01, true);
        metrics.record_publish("ProjectBigData", 0.02, true);
        metrics.record_publish("ProjectBigData", 0.5, false);

        assert_eq!(metrics.records_published.get(), 2);
        assert_eq!(metrics.publish_failures.get(), 1);
    }

    #[test]
    fn test_record_insert_and_entries() {
        let metrics = Metrics::new().unwrap();
        metrics.record_insert(true);
        metrics.record_insert(false);
        metrics.record_manual_entry("deposit");
        metrics.record_manual_entry("deposit");

        assert_eq!(metrics.rows_inserted.get(), 1);
        assert_eq!(metrics.insert_failures.get(), 1);
        assert_eq!(metrics.manual_entries.with_label_values(&["deposit"]).get(), 2);
        assert_eq!(metrics.manual_entries.with_label_values(&["withdrawal"]).get(), 0);
    }
}
