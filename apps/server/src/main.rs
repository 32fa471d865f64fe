//! Cryptowatch - Headless Server
//!
//! Polls cryptocurrency prices, evaluates user price alerts and serves prices,
//! alerts and notifications over HTTP and WebSocket.

mod api;
mod config;
mod state;

use clap::Parser;
use config::{AppConfig, SourceKind};
use cryptowatch_engine::PriceMonitor;
use cryptowatch_feeds::{CoinGeckoFetcher, PriceSource, SimulatedSource};
use state::create_state;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Cryptowatch CLI
#[derive(Parser, Debug)]
#[command(name = "cryptowatch")]
#[command(about = "Crypto price monitor with price alerts", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long)]
    log_level: Option<String>,

    /// HTTP server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Seconds between scheduled refreshes
    #[arg(short, long)]
    interval_secs: Option<u64>,

    /// Use simulated prices instead of the live provider
    #[arg(long, default_value_t = false)]
    simulate: bool,

    /// Comma-separated asset identifiers
    #[arg(short, long, value_delimiter = ',')]
    assets: Option<Vec<String>>,
}

impl Args {
    /// Apply command line overrides on top of file configuration.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(interval) = self.interval_secs {
            config.refresh.interval_secs = interval;
        }
        if self.simulate {
            config.refresh.source = SourceKind::Simulated;
        }
        if let Some(assets) = &self.assets {
            config.refresh.assets = assets.clone();
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_logging(level: &str) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn build_source(config: &AppConfig) -> Result<Arc<dyn PriceSource>, cryptowatch_feeds::FeedError> {
    match config.refresh.source {
        SourceKind::Live => {
            let fetcher = CoinGeckoFetcher::new(
                config.provider.base_url.clone(),
                Duration::from_secs(config.provider.timeout_secs),
            )?;
            Ok(Arc::new(fetcher))
        }
        SourceKind::Simulated => Ok(Arc::new(SimulatedSource::new())),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // The file may set the log level, so it is read before logging is installed.
    let file_config = AppConfig::load(&args.config);
    let mut config = match &file_config {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };
    args.apply(&mut config);
    init_logging(&config.log_level);

    match &file_config {
        Ok(Some(_)) => info!("Loaded config from {}", args.config),
        Ok(None) => info!("Config file {} not found, using defaults", args.config),
        Err(e) => {
            error!("{}", e);
            return;
        }
    }
    if let Err(e) = config.validate() {
        error!("{}", e);
        return;
    }

    info!("🚀 Cryptowatch starting");
    info!("  Source: {:?}", config.refresh.source);
    info!("  Assets: {}", config.asset_ids().join(", "));
    info!("  Refresh interval: {}s", config.refresh.interval_secs);
    info!("  Port: {}", config.server.port);

    let source = match build_source(&config) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to create price source: {}", e);
            return;
        }
    };

    let monitor = PriceMonitor::new(
        source,
        config.scheduler_config(),
        config.server.notification_buffer,
    );
    let state = create_state(monitor.clone());

    let server_handle = match api::start_server(state.clone(), config.server.port).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start HTTP server: {}", e);
            return;
        }
    };

    let scheduler_handle = monitor.start();

    info!("Press Ctrl+C to stop...");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }

    warn!("Shutdown signal received");
    monitor.shutdown();

    if tokio::time::timeout(Duration::from_secs(2), scheduler_handle)
        .await
        .is_err()
    {
        warn!("Refresh scheduler did not stop within 2s");
    }
    server_handle.abort();

    let stats = monitor.stats();
    info!("📈 Final Stats:");
    info!("  Total uptime: {} seconds", state.uptime_secs());
    info!("  Refreshes: {}", stats.refreshes);
    info!("  Failures: {}", stats.failures);
    info!("  Fallbacks: {}", stats.fallbacks);
    info!("  Skipped triggers: {}", stats.skipped);
    info!("  Alerts triggered: {}", stats.triggered);
    info!("  Notifications: {}", stats.notifications);
    info!("  Active alerts: {}", monitor.alerts().len());

    info!("👋 Cryptowatch stopped");
}
