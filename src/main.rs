//! App Review Monitor — Binary Entrypoint
//! Fetches recent App Store reviews, drops the ones already delivered, and
//! posts the rest to a Slack channel. Designed to be invoked by an external
//! scheduler (cron); a single run is sequential and runs to completion.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app_review_monitor::auth::AppStoreTokenService;
use app_review_monitor::notify::slack::SlackNotifier;
use app_review_monitor::reviews::source::AppStoreClient;
use app_review_monitor::reviews::store::SeenSetStore;
use app_review_monitor::Config;

/// Monitor App Store reviews and send them to Slack.
#[derive(Parser, Debug)]
#[command(name = "app-review-monitor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of days to look back for reviews (overrides DAYS_TO_LOOK_BACK)
    #[arg(long)]
    days: Option<i64>,

    /// Print reviews without sending to Slack
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Path to config file
    #[arg(long, default_value = ".env")]
    config: PathBuf,
}

fn init_tracing(debug: bool, log_level: &str) {
    let default_filter = if debug {
        "debug".to_string()
    } else {
        log_level.to_ascii_lowercase()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Missing .env is fine; the environment may already be populated.
    let _ = dotenvy::from_path(&cli.config);

    let config = Config::from_env()?;
    init_tracing(cli.debug, &config.log_level);

    let days = cli.days.unwrap_or(config.days_to_look_back);
    if days < 0 {
        anyhow::bail!("--days must be non-negative");
    }

    let tokens = AppStoreTokenService::from_config(&config);
    let source = AppStoreClient::new(Box::new(tokens));
    let store = SeenSetStore::new(config.state_path.clone());
    let notifier = SlackNotifier::new(config.slack_webhook.clone(), config.slack_channel.clone());

    let result = app_review_monitor::run(
        &source,
        &store,
        &notifier,
        &config.app_id,
        days,
        cli.dry_run,
    )
    .await?;

    for error in &result.errors {
        tracing::warn!(%error, "run finished with a non-fatal error");
    }
    tracing::info!(delivered = result.delivered, "done");
    Ok(())
}
