use crate::model::HalvingEvent;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_coin_id")]
    pub coin_id: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            coin_id: default_coin_id(),
            vs_currency: default_vs_currency(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default = "default_halvings")]
    pub halvings: Vec<HalvingEvent>,
    /// Restricts the chart series to one cycle's window.
    #[serde(default)]
    pub selected_cycle: Option<u32>,
    /// Pins "now" for reproducible reports; wall time when absent.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
    #[serde(default = "default_cache_path")]
    pub cache_path: String,
    #[serde(default = "default_cache_max_age_hours")]
    pub cache_max_age_hours: i64,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            halvings: default_halvings(),
            selected_cycle: None,
            as_of: None,
            cache_path: default_cache_path(),
            cache_max_age_hours: default_cache_max_age_hours(),
            telegram: None,
        }
    }
}

impl AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.halvings.is_empty() {
            return Err(ConfigError::Invalid("no halvings configured".into()));
        }
        for pair in self.halvings.windows(2) {
            if pair[1].cycle <= pair[0].cycle || pair[1].date <= pair[0].date {
                return Err(ConfigError::Invalid(format!(
                    "halvings must be in ascending order (cycle {} after cycle {})",
                    pair[1].cycle, pair[0].cycle
                )));
            }
        }
        if self.cache_max_age_hours < 0 {
            return Err(ConfigError::Invalid("cache_max_age_hours must not be negative".into()));
        }
        if Duration::try_hours(self.cache_max_age_hours).is_none() {
            return Err(ConfigError::Invalid(format!(
                "cache_max_age_hours {} is out of range",
                self.cache_max_age_hours
            )));
        }
        Ok(())
    }

    /// How long a cached series stays usable. Saturates for out-of-range values.
    pub fn cache_max_age(&self) -> Duration {
        Duration::try_hours(self.cache_max_age_hours).unwrap_or(Duration::MAX)
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// The four Bitcoin halvings.
pub fn default_halvings() -> Vec<HalvingEvent> {
    [
        ((2012, 11, 28), 1, 210_000),
        ((2016, 7, 9), 2, 420_000),
        ((2020, 5, 11), 3, 630_000),
        ((2024, 4, 20), 4, 840_000),
    ]
    .into_iter()
    .filter_map(|((y, m, d), cycle, height)| {
        NaiveDate::from_ymd_opt(y, m, d).map(|date| HalvingEvent::new(date, cycle, height))
    })
    .collect()
}

fn default_base_url() -> String {
    "https://api.coingecko.com/api/v3".into()
}

fn default_coin_id() -> String {
    "bitcoin".into()
}

fn default_vs_currency() -> String {
    "usd".into()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1_000
}

fn default_cache_path() -> String {
    "prices.db".into()
}

fn default_cache_max_age_hours() -> i64 {
    12
}
