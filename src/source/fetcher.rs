use crate::config::SourceConfig;
use crate::model::SourceError;
use crate::source::traits::PriceSource;

use rand::Rng;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const MAX_JITTER_MS: u64 = 250;

pub struct HttpPriceSource {
    client: Client,
    base_url: String,
    coin_id: String,
    vs_currency: String,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl HttpPriceSource {
    pub fn new(cfg: &SourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent("HalvingCycles/0.1")
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()
            .map_err(|e| SourceError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            coin_id: cfg.coin_id.clone(),
            vs_currency: cfg.vs_currency.clone(),
            max_retries: cfg.max_retries,
            retry_backoff_ms: cfg.retry_backoff_ms,
        })
    }

    fn build_url(&self) -> String {
        format!(
            "{}/coins/{}/market_chart?vs_currency={}&days=max&interval=daily",
            self.base_url, self.coin_id, self.vs_currency
        )
    }

    async fn fetch_once(&self, url: &str) -> Result<String, SourceError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::InvalidResponse(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::HttpError(e.to_string()))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let jitter = rand::rng().random_range(0..=MAX_JITTER_MS);
        let base = self.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16));
        Duration::from_millis(base.saturating_add(jitter))
    }
}

/// Transport failures, rate limiting and server errors are worth another attempt.
fn is_retryable(err: &SourceError) -> bool {
    match err {
        SourceError::HttpError(_) | SourceError::Timeout => true,
        SourceError::InvalidResponse(code) => {
            *code == StatusCode::TOO_MANY_REQUESTS.as_u16() || (500..600).contains(code)
        }
    }
}

#[async_trait::async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        let url = self.build_url();
        let mut attempt = 0;
        loop {
            info!("Fetching price history: {} (attempt {})", url, attempt + 1);
            match self.fetch_once(&url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    let delay = self.backoff(attempt);
                    warn!("Fetch failed: {}. Retrying in {} ms", e, delay.as_millis());
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
