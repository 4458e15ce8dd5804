//! tradecore: single-venue trading simulator engine
//!
//! Accepts orders over a router-style message socket, matches them against
//! per-symbol books, reports executions, and keeps positions.

mod booking;
mod config;
mod error;
mod events;
mod lifecycle;
mod metrics;
mod models;
mod protocol;
mod server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use matching_engine::MatchingEngine;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use booking::BookKeeper;
use config::Config;
use lifecycle::Lifecycle;
use metrics::EngineMetrics;

#[derive(Parser)]
#[command(name = "tradecore")]
#[command(about = "Single-venue trading simulator: matching engine and order gateway")]
struct Cli {
    /// Socket address to bind, e.g. 0.0.0.0:5555
    #[arg(long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Commission rate applied per fill
    #[arg(long)]
    commission_rate: Option<f64>,

    /// Full bid-ask spread in basis points for seeded books
    #[arg(long)]
    spread_bps: Option<f64>,

    /// Path to the TOML config file
    #[arg(long, default_value = "tradecore.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config);
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(rate) = cli.commission_rate {
        config.commission.rate = rate;
    }
    if let Some(spread) = cli.spread_bps {
        config.matching.spread_bps = spread;
    }

    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        bind = %config.server.bind_address,
        commission_rate = config.commission.rate,
        spread_bps = config.matching.spread_bps,
        "starting tradecore"
    );

    let metrics = Arc::new(EngineMetrics::new());
    let matcher = MatchingEngine::with_seed_config(config.seed_config());
    let lifecycle = Lifecycle::new(
        matcher,
        BookKeeper::new(),
        config.commission_rate(),
        metrics.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            let _ = shutdown_tx.send(true);
        }
    });

    if config.metrics.enabled {
        tokio::spawn(report_metrics(
            metrics.clone(),
            Duration::from_secs(config.metrics.report_interval_s.max(1)),
            shutdown_rx.clone(),
        ));
    }

    server::run(&config.server.bind_address, lifecycle, metrics, shutdown_rx).await?;

    tracing::info!("clean shutdown");
    Ok(())
}

/// Log a metrics summary on a fixed cadence until shutdown
async fn report_metrics(
    metrics: Arc<EngineMetrics>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // immediate first tick
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::info!(metrics = %metrics.summary(), "engine metrics");
            }
            _ = shutdown.changed() => break,
        }
    }
}
