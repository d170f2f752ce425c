use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dripfeed::config::{self, AppConfig};
use dripfeed::notifier::{FailureReason, Notifier, Outcome, SlackWebhook, WebhookSender};
use dripfeed::scrape::{extract_candidates, fetch_page};
use dripfeed::seen_store::{JsonFileSeenStore, SeenStore};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Slack incoming-webhook URL to deliver notifications to.
    pub webhook_url: String,

    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// URL of the trending posts page to watch.
    #[clap(long, default_value = config::DEFAULT_PAGE_URL)]
    pub page_url: String,

    /// Path of the JSON file recording recently notified posts.
    #[clap(long, default_value = config::DEFAULT_STORE_PATH)]
    pub store_path: PathBuf,

    /// Days a notified post stays recorded before it may notify again.
    #[clap(long, default_value_t = config::DEFAULT_RETENTION_DAYS)]
    pub retention_days: u64,

    /// Timeout in seconds for the page fetch and the webhook delivery.
    #[clap(long, default_value_t = config::DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            webhook_url: args.webhook_url.clone(),
            page_url: args.page_url.clone(),
            store_path: args.store_path.clone(),
            retention_days: args.retention_days,
            http_timeout_secs: args.http_timeout_secs,
        }
    }
}

// Exit code families, so an external scheduler can tell a failed delivery
// (safe to retry the whole run) from a persistence failure (the same post
// may notify again).
const EXIT_DELIVERY_FAILED: u8 = 10;
const EXIT_PERSISTENCE_FAILED: u8 = 20;

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .init();

    match run(&cli_args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli_args: &CliArgs) -> Result<ExitCode> {
    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config: config::CliConfig = cli_args.into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!(
        "dripfeed {}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );
    info!(
        "Watching {} (retention {} days, store {:?})",
        app_config.page_url, app_config.retention_days, app_config.store_path
    );

    let timeout = Duration::from_secs(app_config.http_timeout_secs);
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let store = Arc::new(JsonFileSeenStore::new(
        &app_config.store_path,
        app_config.retention_days,
    ));
    let sender = Arc::new(SlackWebhook::new(
        client.clone(),
        &app_config.webhook_url,
        timeout,
    ));
    let notifier = Notifier::new(store as Arc<dyn SeenStore>, sender as Arc<dyn WebhookSender>);

    let html = fetch_page(&client, &app_config.page_url).await?;
    let candidates = extract_candidates(&html)?;
    info!("Extracted {} candidate post(s)", candidates.len());

    let code = match notifier.process_first_new(&candidates).await {
        Outcome::Delivered => ExitCode::SUCCESS,
        Outcome::SkippedDuplicate => {
            info!("No new posts to notify");
            ExitCode::SUCCESS
        }
        Outcome::Failed(FailureReason::Delivery(e)) => {
            error!("Delivery failed: {}", e);
            ExitCode::from(EXIT_DELIVERY_FAILED)
        }
        Outcome::Failed(reason @ FailureReason::Persistence(_)) => {
            error!("{}", reason);
            ExitCode::from(EXIT_PERSISTENCE_FAILED)
        }
        Outcome::Failed(reason @ FailureReason::StoreUnavailable(_)) => {
            error!("{}", reason);
            ExitCode::from(EXIT_PERSISTENCE_FAILED)
        }
        Outcome::Failed(reason) => {
            error!("{}", reason);
            ExitCode::FAILURE
        }
    };

    Ok(code)
}
