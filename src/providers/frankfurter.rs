use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::cache::Cache;
use crate::config::AppConfig;
use crate::rate_provider::RateHistoryProvider;

/// Upper bound for a single upstream request. There is no overall deadline
/// across the retry-plus-fallback sequence; callers wanting one must impose
/// it externally.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Frankfurter time-series provider with retries and a local snapshot
/// fallback.
///
/// Lookup order: cache, then up to `retry_attempts` upstream requests with
/// exponential backoff, then the fallback file. A payload from either source
/// is cached under the same key and TTL.
pub struct FrankfurterProvider {
    base_url: String,
    base_currency: String,
    quote_currency: String,
    retry_attempts: usize,
    retry_backoff: Duration,
    cache_ttl: Duration,
    fallback_file: PathBuf,
    cache: Arc<Cache<String, Value>>,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str, config: &AppConfig, cache: Arc<Cache<String, Value>>) -> Self {
        FrankfurterProvider {
            base_url: base_url.to_string(),
            base_currency: config.base_currency.clone(),
            quote_currency: config.quote_currency.clone(),
            retry_attempts: config.retry_attempts,
            retry_backoff: Duration::from_secs_f64(config.retry_backoff_secs),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            fallback_file: config.fallback_file.clone(),
            cache,
        }
    }

    async fn attempt_fetch(&self, client: &reqwest::Client, url: &str) -> Result<Value> {
        let response = client
            .get(url)
            .query(&[
                ("from", self.base_currency.as_str()),
                ("to", self.quote_currency.as_str()),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for URL: {}",
                response.status(),
                url
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| anyhow!("Failed to read response body for URL: {}: {}", url, e))
    }

    async fn fetch_with_retries(&self, url: &str) -> Result<Value> {
        let client = reqwest::Client::builder()
            .user_agent("fxsum/1.0")
            .timeout(ATTEMPT_TIMEOUT)
            .build()?;

        let mut last_error = None;
        for attempt in 0..self.retry_attempts {
            debug!(
                "API request attempt {}/{} to {}",
                attempt + 1,
                self.retry_attempts,
                url
            );
            match self.attempt_fetch(&client, url).await {
                Ok(payload) => {
                    debug!("API request successful on attempt {}", attempt + 1);
                    return Ok(payload);
                }
                Err(e) => {
                    warn!("API request attempt {} failed: {e}", attempt + 1);
                    last_error = Some(e);
                    if attempt + 1 < self.retry_attempts {
                        let delay = self.retry_backoff.mul_f64(2f64.powi(attempt as i32));
                        debug!("Retrying in {:.2}s", delay.as_secs_f64());
                        sleep(delay).await;
                    }
                }
            }
        }

        warn!("All {} API request attempts failed", self.retry_attempts);
        Err(last_error.unwrap_or_else(|| anyhow!("No request attempts were made")))
    }

    async fn load_fallback(&self) -> Result<Value> {
        debug!(
            "Loading fallback data from {}",
            self.fallback_file.display()
        );
        let contents = tokio::fs::read_to_string(&self.fallback_file)
            .await
            .with_context(|| {
                format!(
                    "Failed to read fallback file: {}",
                    self.fallback_file.display()
                )
            })?;
        serde_json::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse fallback file: {}",
                self.fallback_file.display()
            )
        })
    }
}

#[async_trait]
impl RateHistoryProvider for FrankfurterProvider {
    #[instrument(
        name = "FrankfurterFetch",
        skip(self),
        fields(start = %start, end = %end)
    )]
    async fn fetch_history(&self, start: NaiveDate, end: NaiveDate) -> Result<Value> {
        let cache_key = format!(
            "{}..{}::{}->{}",
            start, end, self.base_currency, self.quote_currency
        );
        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!("Returning cached rate history");
            return Ok(cached);
        }

        let url = format!("{}/{}..{}", self.base_url, start, end);
        match self.fetch_with_retries(&url).await {
            Ok(payload) => {
                self.cache
                    .put(cache_key, payload.clone(), self.cache_ttl)
                    .await;
                Ok(payload)
            }
            Err(api_err) => {
                warn!("API request failed: {api_err}. Attempting fallback to local file");
                match self.load_fallback().await {
                    Ok(payload) => {
                        self.cache
                            .put(cache_key, payload.clone(), self.cache_ttl)
                            .await;
                        Ok(payload)
                    }
                    Err(fallback_err) => Err(anyhow!(
                        "Failed to fetch exchange rates from API and fallback (api: {}; fallback: {})",
                        api_err,
                        fallback_err
                    )),
                }
            }
        }
    }
}
