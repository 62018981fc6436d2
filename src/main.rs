use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod dashboard;
mod domain;
mod entry;
mod errors;
mod ingest;
mod messaging;
mod metrics;
mod store;

use config::{AppConfig, Cli, Command};
use entry::{run_terminal, EntrySession};
use errors::PipelineError;
use messaging::{EventPublisher, Origin, RedpandaClient, SinkHandler, TopicSink};
use metrics::Metrics;
use store::TransactionStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the entry form.
    // Override with RUST_LOG, e.g. RUST_LOG=bank_stream=trace
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,bank_stream=debug")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli);

    let metrics = Arc::new(Metrics::new()?);
    tracing::debug!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    match cli.command {
        Command::Produce { no_entry, .. } => run_producer(&config, metrics, !no_entry).await,
        Command::Entry => run_entry(&config, metrics).await,
        Command::Sink { reset, .. } => run_sink(&config, metrics, reset).await,
        Command::Dashboard { .. } => run_dashboard(&config, metrics).await,
    }
}

async fn connect_store(config: &AppConfig, metrics: Arc<Metrics>) -> Result<Arc<TransactionStore>, PipelineError> {
    tracing::info!(url = %config.store.database_url, "Connecting to store");
    Ok(Arc::new(TransactionStore::connect(&config.store, metrics).await?))
}

fn connect_publisher(config: &AppConfig, metrics: Arc<Metrics>) -> Result<EventPublisher<RedpandaClient>, PipelineError> {
    tracing::info!(brokers = %config.broker.bootstrap_servers, topic = %config.broker.topic, "Connecting to broker");
    let client = RedpandaClient::new(&config.broker)?;
    Ok(EventPublisher::new(client, config.broker.topic.clone(), &config.publisher, metrics))
}

fn serve_metrics(config: &AppConfig, metrics: &Arc<Metrics>) {
    if let Some(port) = config.metrics_port {
        metrics::spawn_metrics_server(metrics.clone(), port);
    }
}

/// Seed the topic from the CSV import, then hand over to the entry form.
async fn run_producer(config: &AppConfig, metrics: Arc<Metrics>, with_entry: bool) -> anyhow::Result<()> {
    serve_metrics(config, &metrics);

    let store = connect_store(config, metrics.clone()).await?;
    let publisher = connect_publisher(config, metrics.clone())?;

    let records = ingest::load_records(&config.import.csv_path, config.import.seed_count).map_err(PipelineError::from)?;
    tracing::info!(
        path = %config.import.csv_path.display(),
        count = records.len(),
        "🚀 Seeding topic from bulk import"
    );

    let sent = publisher
        .publish_batch(&records, Origin::Import)
        .await
        .map_err(PipelineError::from)?;
    tracing::info!(sent, topic = %publisher.topic(), "✅ Seeding complete");

    if !with_entry {
        store.close().await;
        return Ok(());
    }

    let mut session = EntrySession::start(publisher, store.clone(), metrics).await;
    let result = run_terminal(&mut session).await;
    store.close().await;
    result
}

async fn run_entry(config: &AppConfig, metrics: Arc<Metrics>) -> anyhow::Result<()> {
    serve_metrics(config, &metrics);

    let store = connect_store(config, metrics.clone()).await?;
    let publisher = connect_publisher(config, metrics.clone())?;

    let mut session = EntrySession::start(publisher, store.clone(), metrics).await;
    let result = run_terminal(&mut session).await;
    store.close().await;
    result
}

async fn run_sink(config: &AppConfig, metrics: Arc<Metrics>, reset: bool) -> anyhow::Result<()> {
    serve_metrics(config, &metrics);

    let store = connect_store(config, metrics.clone()).await?;
    if reset {
        tracing::warn!("Resetting transactions table");
        store.reset().await.map_err(PipelineError::from)?;
    }

    let sink = TopicSink::new(&config.broker, SinkHandler::new(store, metrics)).map_err(PipelineError::from)?;
    sink.run().await.map_err(PipelineError::from)?;
    Ok(())
}

async fn run_dashboard(config: &AppConfig, metrics: Arc<Metrics>) -> anyhow::Result<()> {
    let store = connect_store(config, metrics.clone()).await?;
    dashboard::start_dashboard(&config.dashboard, store, metrics).await?;
    Ok(())
}
