use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::normalize;
use crate::rate_provider::RateHistoryProvider;
use crate::summary::{self, RateSummary};

/// One calendar day of the requested range. `rate` is absent for days the
/// source did not report; `pct_change` compares against the immediately
/// preceding day only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub rate: Option<f64>,
    pub pct_change: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateReport {
    pub days: Vec<DayRecord>,
    pub summary: RateSummary,
}

/// Whether the caller wants the per-day records or only the summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportMode {
    Full,
    SummaryOnly,
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date format. Use YYYY-MM-DD"))
}

/// Builds one record per calendar day from `start` to `end` inclusive, in
/// ascending order. The first record never carries a percent change.
pub fn build_day_series(
    rates: &BTreeMap<NaiveDate, f64>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DayRecord> {
    let mut days = Vec::new();
    let mut prev_rate: Option<f64> = None;

    for date in start.iter_days().take_while(|d| *d <= end) {
        let rate = rates.get(&date).copied();

        let pct_change = match (prev_rate, rate) {
            (Some(prev), Some(current)) if prev != 0.0 => {
                Some((current - prev) / prev * 100.0)
            }
            _ => None,
        };

        days.push(DayRecord {
            date,
            rate,
            pct_change,
        });
        prev_rate = rate;
    }

    days
}

/// Runs the full pipeline: validate the range, fetch, normalize, build the
/// day series and derive its summary.
pub async fn get_report(
    start: &str,
    end: &str,
    mode: ReportMode,
    provider: &(dyn RateHistoryProvider),
    quote_currency: &str,
) -> Result<RateReport> {
    debug!("Report requested: start={start}, end={end}, mode={mode:?}");

    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if start > end {
        return Err(anyhow!("start must be <= end"));
    }

    let payload = provider.fetch_history(start, end).await?;
    let rates = normalize::rates_by_date(&payload, quote_currency);

    let days = build_day_series(&rates, start, end);
    let summary = summary::summarize(&days);
    debug!(
        "Report completed: {} days processed, summary={summary:?}",
        days.len()
    );

    Ok(RateReport {
        days: match mode {
            ReportMode::Full => days,
            ReportMode::SummaryOnly => Vec::new(),
        },
        summary,
    })
}
