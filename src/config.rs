use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// Configuration
// ============================================================================
//
// Each component receives its own config struct at construction. Defaults are
// the fixed endpoints of the demo setup; every value can be overridden from
// the command line or the matching BANK_STREAM_* environment variable.
//
// ============================================================================

pub const DEFAULT_BROKERS: &str = "localhost:9092";
pub const DEFAULT_TOPIC: &str = "ProjectBigData";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/TransactionDB.db";
pub const DEFAULT_CSV_PATH: &str = "./data/client_transactions.csv";
pub const DEFAULT_SINK_GROUP: &str = "bank-stream-sink";
pub const DEFAULT_SEED_COUNT: usize = 5;
pub const DEFAULT_PACING_MS: u64 = 1000;
pub const DEFAULT_DASHBOARD_PORT: u16 = 8501;

#[derive(Parser, Debug)]
#[command(name = "bank_stream", version, about = "Stream bank transactions from CSV through a topic into SQLite")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Kafka bootstrap servers
    #[arg(long, global = true, env = "BANK_STREAM_BROKERS", default_value = DEFAULT_BROKERS)]
    pub brokers: String,

    /// Topic carrying transaction events
    #[arg(long, global = true, env = "BANK_STREAM_TOPIC", default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// SQLite database URL
    #[arg(long, global = true, env = "BANK_STREAM_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Delay between two consecutive publishes, in milliseconds
    #[arg(long, global = true, env = "BANK_STREAM_PACING_MS", default_value_t = DEFAULT_PACING_MS)]
    pub pacing_ms: u64,

    /// Serve Prometheus metrics on this port (producer and sink only)
    #[arg(long, global = true, env = "BANK_STREAM_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Seed the topic from the CSV import, then run the entry form
    Produce {
        #[arg(long, default_value = DEFAULT_CSV_PATH)]
        csv: PathBuf,

        /// Number of leading CSV rows to publish
        #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
        seed_count: usize,

        /// Exit after seeding instead of starting the entry form
        #[arg(long)]
        no_entry: bool,
    },
    /// Run the interactive entry form only
    Entry,
    /// Consume the topic and append imported records to the store
    Sink {
        /// Drop and recreate the transactions table before consuming
        #[arg(long)]
        reset: bool,

        #[arg(long, default_value = DEFAULT_SINK_GROUP)]
        group_id: String,
    },
    /// Serve the visualization dashboard
    Dashboard {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = DEFAULT_DASHBOARD_PORT)]
        port: u16,
    },
}

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub bootstrap_servers: String,
    pub topic: String,
    pub message_timeout: Duration,
    pub group_id: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: DEFAULT_BROKERS.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            message_timeout: Duration::from_secs(5),
            group_id: DEFAULT_SINK_GROUP.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Sleep after every send
    pub pacing: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_DASHBOARD_PORT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub csv_path: PathBuf,
    pub seed_count: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            seed_count: DEFAULT_SEED_COUNT,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub broker: BrokerConfig,
    pub store: StoreConfig,
    pub publisher: PublisherConfig,
    pub dashboard: DashboardConfig,
    pub import: ImportConfig,
    pub metrics_port: Option<u16>,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let options = &cli.options;
        let mut config = AppConfig {
            broker: BrokerConfig {
                bootstrap_servers: options.brokers.clone(),
                topic: options.topic.clone(),
                ..BrokerConfig::default()
            },
            store: StoreConfig {
                database_url: options.database_url.clone(),
            },
            publisher: PublisherConfig {
                pacing: Duration::from_millis(options.pacing_ms),
            },
            metrics_port: options.metrics_port,
            ..AppConfig::default()
        };

        match &cli.command {
            Command::Produce { csv, seed_count, .. } => {
                config.import = ImportConfig {
                    csv_path: csv.clone(),
                    seed_count: *seed_count,
                };
            }
            Command::Sink { group_id, .. } => {
                config.broker.group_id = group_id.clone();
            }
            Command::Dashboard { host, port } => {
                config.dashboard = DashboardConfig {
                    host: host.clone(),
                    port: *port,
                };
            }
            Command::Entry => {}
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_setup() {
        let cli = Cli::try_parse_from(["bank_stream", "entry"]).unwrap();
        let config = AppConfig::from_cli(&cli);

        assert_eq!(config.broker.bootstrap_servers, "localhost:9092");
        assert_eq!(config.broker.topic, "ProjectBigData");
        assert_eq!(config.publisher.pacing, Duration::from_secs(1));
        assert_eq!(config.import.seed_count, 5);
        assert_eq!(config.metrics_port, None);
    }

    #[test]
    fn test_subcommand_options_flow_into_config() {
        let cli = Cli::try_parse_from([
            "bank_stream",
            "produce",
            "--csv",
            "fixtures/tx.csv",
            "--seed-count",
            "2",
            "--topic",
            "other-topic",
            "--pacing-ms",
            "10",
        ])
        .unwrap();
        let config = AppConfig::from_cli(&cli);

        assert_eq!(config.import.csv_path, PathBuf::from("fixtures/tx.csv"));
        assert_eq!(config.import.seed_count, 2);
        assert_eq!(config.broker.topic, "other-topic");
        assert_eq!(config.publisher.pacing, Duration::from_millis(10));
    }

    #[test]
    fn test_dashboard_port_override() {
        let cli = Cli::try_parse_from(["bank_stream", "dashboard", "--port", "9000"]).unwrap();
        let config = AppConfig::from_cli(&cli);

        assert_eq!(config.dashboard.port, 9000);
        assert_eq!(config.dashboard.host, "127.0.0.1");
    }
}
