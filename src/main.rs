mod analyzer;
mod config;
mod model;
mod normalizer;
mod notifier;
mod parser;
mod report;
mod source;
mod storage;
mod utils;

use analyzer::{Clock, CycleAnalysisRunner, FixedClock, SystemClock, series_for_cycle, summarize};
use config::{AppConfig, load_config};
use model::{ParserError, PriceSample, SourceError};
use normalizer::normalize_all;
use notifier::TelegramNotifier;
use parser::{MarketChartParser, Parser};
use source::{HttpPriceSource, PriceSource};
use std::path::Path;
use storage::SqliteStorage;
use thiserror::Error;
use tracing::{debug, error, info, warn};

const CONFIG_PATH: &str = "config.json";

#[derive(Debug, Error)]
enum LoadError {
    #[error("price source failed: {0}")]
    Source(#[from] SourceError),
    #[error("price payload rejected: {0}")]
    Parse(#[from] ParserError),
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = if Path::new(CONFIG_PATH).exists() {
        match load_config(CONFIG_PATH) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Config load error: {}", e);
                return;
            }
        }
    } else {
        info!("No {} found, using defaults", CONFIG_PATH);
        AppConfig::default()
    };

    let mut storage = match SqliteStorage::new(&config.cache_path) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Price cache unavailable, fetching without it: {}", e);
            None
        }
    };

    let notifier = config.telegram.as_ref().and_then(|cfg| match TelegramNotifier::new(cfg) {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("Telegram disabled: {}", e);
            None
        }
    });

    let series = match load_series(&config, storage.as_mut()).await {
        Ok(series) => series,
        Err(e) => {
            error!("Price history unavailable: {}", e);
            if let Some(notifier) = &notifier {
                let text = format!("⚠️ Halving cycle analysis unavailable: {}", e);
                if let Err(e) = notifier.notify_text(&text).await {
                    warn!("Telegram send error: {}", e);
                }
            }
            return;
        }
    };

    let report = match config.as_of {
        Some(as_of) => run_analysis(&config, &series, CycleAnalysisRunner::new(FixedClock(as_of))),
        None => run_analysis(&config, &series, CycleAnalysisRunner::new(SystemClock)),
    };
    println!("{}", report);

    if let Some(notifier) = &notifier {
        info!("Sending report to Telegram...");
        if let Err(e) = notifier.notify_report(&report).await {
            warn!("Telegram send error: {}", e);
        }
    }
}

/// Serves the series from the cache when fresh, otherwise fetches and refreshes the cache.
/// A failed fetch is final: a stale cache is never used in its place.
async fn load_series(
    config: &AppConfig,
    storage: Option<&mut SqliteStorage>,
) -> Result<Vec<PriceSample>, LoadError> {
    let max_age = config.cache_max_age();
    let now = chrono::Utc::now();

    if let Some(storage) = storage.as_deref() {
        match storage.is_fresh(max_age, now) {
            Ok(true) => match storage.load_series() {
                Ok(series) if !series.is_empty() => {
                    info!("Using {} cached samples", series.len());
                    return Ok(series);
                }
                Ok(_) => info!("Price cache is empty"),
                Err(e) => warn!("Cache read failed: {}", e),
            },
            Ok(false) => info!("Price cache is stale"),
            Err(e) => warn!("Cache check failed: {}", e),
        }
    }

    let source = HttpPriceSource::new(&config.source)?;
    let payload = source.fetch().await?;
    let mut series = MarketChartParser::new().parse(&payload)?;
    normalize_all(&mut series);
    info!("Fetched {} samples", series.len());

    if let Some(storage) = storage {
        if let Err(e) = storage.replace_series(&series, now) {
            warn!("Cache write failed: {}", e);
        }
    }

    Ok(series)
}

fn run_analysis<C: Clock>(
    config: &AppConfig,
    series: &[PriceSample],
    runner: CycleAnalysisRunner<C>,
) -> String {
    let results = runner.run(series, &config.halvings);
    let summary = summarize(&results);
    match serde_json::to_string(&results) {
        Ok(json) => debug!("Cycle analysis: {}", json),
        Err(e) => warn!("Cannot serialize cycle analysis: {}", e),
    }

    let chart = series_for_cycle(series, &config.halvings, config.selected_cycle, runner.now_ts());
    match config.selected_cycle {
        Some(cycle) => info!("Chart series for cycle {}: {} samples", cycle, chart.len()),
        None => info!("Chart series: {} samples", chart.len()),
    }

    report::render_report(&results, &summary)
}
