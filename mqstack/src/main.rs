//! mqstack - local message queue and topic broker
//!
//! Loads configuration, builds a broker and runs the maintenance sweeper
//! until interrupted. Protocol front ends embed the library crate.

use clap::Parser;
use mqstack::{Broker, Config};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mqstack")]
#[command(about = "Local message queue and topic broker", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "MQSTACK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MQSTACK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Milliseconds between maintenance sweeps (0 disables)
    #[arg(long, env = "MQSTACK_SWEEP_INTERVAL_MS")]
    sweep_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(interval) = args.sweep_interval_ms {
        config.sweeper.interval_ms = interval;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mqstack={}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let broker = Arc::new(Broker::new(&config.broker));
    info!(
        account_id = %config.broker.account_id,
        region = %config.broker.region,
        base_url = %config.broker.base_url,
        "Starting mqstack"
    );

    let sweeper = (config.sweeper.interval_ms > 0)
        .then(|| broker.spawn_sweeper(Duration::from_millis(config.sweeper.interval_ms)));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    if let Some(handle) = sweeper {
        handle.abort();
    }

    Ok(())
}
