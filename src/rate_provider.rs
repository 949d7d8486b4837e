//! Provides historical exchange-rate retrieval for the application.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Fetches the raw rate history payload for a fixed currency pair.
///
/// The payload shape is not trusted; callers run it through
/// [`crate::normalize::rates_by_date`] before using it.
#[async_trait]
pub trait RateHistoryProvider: Send + Sync {
    async fn fetch_history(&self, start: NaiveDate, end: NaiveDate) -> Result<serde_json::Value>;
}
