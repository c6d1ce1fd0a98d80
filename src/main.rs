use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use channel_reconciler::{
    aggregator::AggregatorSyncClient,
    config::{defaults::DEFAULT_CONFIG_FILE, Config},
    errors::AppResult,
    media_server::GuideRefreshTrigger,
    orchestrator::{Orchestrator, SettlePolicy},
    reconciler::Reconciler,
    rules::RuleEngine,
    sources::ProviderClient,
};

#[derive(Parser)]
#[command(name = "channel-reconciler")]
#[command(version)]
#[command(about = "Enable wanted IPTV channels, map their guide in xTeVe and refresh the Emby guide")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Environment file loaded before the configuration
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Scrape and plan only; change nothing anywhere
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loaded before logging so RUST_LOG from the file is honoured
    let env_loaded = match &cli.env_file {
        Some(path) => dotenvy::from_path(path).map(|_| path.display().to_string()),
        None => dotenvy::dotenv().map(|path| path.display().to_string()),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("channel_reconciler={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting channel reconciler v{}", env!("CARGO_PKG_VERSION"));
    match env_loaded {
        Ok(path) => info!("Environment loaded from: {}", path),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to load environment file: {}", e),
    }

    if let Err(e) = run(&cli).await {
        if e.is_fatal() {
            error!("Run aborted: {}", e);
        } else {
            error!("Run finished with failures: {}", e);
        }
        return Err(e.into());
    }
    Ok(())
}

async fn run(cli: &Cli) -> AppResult<()> {
    let config = Config::load_from(Some(cli.config.as_path()))?;
    info!("Configuration loaded from: {}", cli.config.display());
    config.log_summary();

    let reconciler = Reconciler::new(
        ProviderClient::new(&config.provider)?,
        RuleEngine::from_settings(&config.rules),
    );
    let orchestrator = Orchestrator::new(
        reconciler,
        AggregatorSyncClient::from_settings(&config.aggregator),
        GuideRefreshTrigger::from_settings(&config.media_server)?,
        SettlePolicy::from_settings(&config.sync),
    )
    .with_dry_run(cli.dry_run);

    let outcome = orchestrator.run().await?;
    info!("Done: {}", outcome);
    Ok(())
}
