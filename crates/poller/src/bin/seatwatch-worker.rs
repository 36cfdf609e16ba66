//! seatwatch-worker — standalone polling worker.
//!
//! Wires config → store → Banner client → poller and runs sweeps until
//! ctrl-c. Runs with the logging sink; a chat front-end embeds the
//! library crates instead and supplies its own `NotificationSink` and
//! `WatchStore` handle.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::Notify;
use tracing::info;

use seatwatch_banner::BannerClient;
use seatwatch_core::{config::load_dotenv, Config};
use seatwatch_poller::{LogSink, Poller};
use seatwatch_tracker::WatchStore;

// ── CLI ─────────────────────────────────────────────────────────────

/// Seat availability polling worker.
#[derive(Parser, Debug)]
#[command(name = "seatwatch-worker", version, about)]
struct Cli {
    /// Seconds between sweeps (overrides SEATWATCH_POLL_INTERVAL_SECS).
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Maximum concurrent queries within one sweep (overrides
    /// SEATWATCH_POLL_CONCURRENCY).
    #[arg(long)]
    concurrency: Option<usize>,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(interval) = cli.interval_secs {
        config.poll.interval_secs = interval;
    }
    if let Some(concurrency) = cli.concurrency {
        config.poll.concurrency = concurrency.max(1);
    }
    config.log_summary();

    let store = WatchStore::new();
    let client = Arc::new(BannerClient::from_config(&config.banner));
    let poller = Poller::new(store, client, Arc::new(LogSink), config.poll.clone());

    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received, stopping after current sweep");
                shutdown.notify_one();
            }
        });
    }

    info!("seatwatch-worker starting");
    poller.run(shutdown).await;
    info!("seatwatch-worker exited cleanly");

    Ok(())
}
