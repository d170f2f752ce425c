//! Runtime configuration: CLI arguments merged with an optional TOML file.

mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_PAGE_URL: &str = "https://dribbble.com/shots?timeframe=week";
pub const DEFAULT_STORE_PATH: &str = "recent_posts.json";
pub const DEFAULT_RETENTION_DAYS: u64 = 14;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub webhook_url: String,
    pub page_url: String,
    pub store_path: PathBuf,
    pub retention_days: u64,
    pub http_timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            page_url: DEFAULT_PAGE_URL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            retention_days: DEFAULT_RETENTION_DAYS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub webhook_url: String,
    pub page_url: String,
    pub store_path: PathBuf,
    pub retention_days: u64,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let webhook_url = file.webhook_url.unwrap_or_else(|| cli.webhook_url.clone());
        if webhook_url.trim().is_empty() {
            bail!("Webhook URL must not be empty");
        }

        let page_url = file.page_url.unwrap_or_else(|| cli.page_url.clone());

        let store_path = file
            .store_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.store_path.clone());

        let retention_days = file.retention_days.unwrap_or(cli.retention_days);
        if retention_days == 0 {
            bail!("retention_days must be at least 1");
        }

        let http_timeout_secs = file.http_timeout_secs.unwrap_or(cli.http_timeout_secs);
        if http_timeout_secs == 0 {
            bail!("http_timeout_secs must be at least 1");
        }

        Ok(Self {
            webhook_url,
            page_url,
            store_path,
            retention_days,
            http_timeout_secs,
        })
    }
}
