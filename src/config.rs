use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration, loaded once at start-up.
///
/// Sources, later ones winning: `config/default.toml`, `config/local.toml`,
/// then `PRICE_TRACKER__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default = "default_check_interval_seconds")]
    pub check_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_products_csv")]
    pub products_csv: PathBuf,
    #[serde(default = "default_prices_csv")]
    pub prices_csv: PathBuf,
    #[serde(default = "default_history_db")]
    pub history_db: PathBuf,
    #[serde(default)]
    pub history_backend: HistoryBackend,
    #[serde(default)]
    pub history_mode: HistoryMode,
    #[serde(default = "default_true")]
    pub save_history: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Csv,
    Sqlite,
}

/// How the CSV history file is written each cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Keep earlier cycles and add the new rows after them.
    #[default]
    Append,
    /// Replace the file with the latest cycle only.
    Overwrite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook: Option<String>,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_products_csv() -> PathBuf {
    PathBuf::from("data/products.csv")
}
fn default_prices_csv() -> PathBuf {
    PathBuf::from("data/prices.csv")
}
fn default_history_db() -> PathBuf {
    PathBuf::from("data/prices.db")
}
fn default_true() -> bool {
    true
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:80.0) Gecko/20100101 Firefox/80.0".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_check_interval_seconds() -> u64 {
    3600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            http: HttpConfig::default(),
            discord: DiscordConfig::default(),
            check_interval_seconds: default_check_interval_seconds(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            products_csv: default_products_csv(),
            prices_csv: default_prices_csv(),
            history_db: default_history_db(),
            history_backend: HistoryBackend::default(),
            history_mode: HistoryMode::default(),
            save_history: true,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PRICE_TRACKER").separator("__"))
            .build()
            .context("Failed to read configuration")?;

        cfg.try_deserialize().context("Invalid configuration")
    }
}
