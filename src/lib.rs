pub mod cache;
pub mod config;
pub mod log;
pub mod normalize;
pub mod providers;
pub mod rate_provider;
pub mod series;
pub mod summary;
pub mod ui;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub use series::ReportMode;

/// One `summary` invocation as received from the CLI.
pub struct SummaryRequest {
    pub start: String,
    pub end: String,
    pub mode: ReportMode,
    pub json: bool,
}

pub async fn run_summary(request: &SummaryRequest, config_path: Option<&str>) -> Result<()> {
    info!("Exchange rate summary starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // One cache per service lifetime, shared with the fetch path
    let cache = Arc::new(cache::Cache::<String, serde_json::Value>::new());

    let base_url = config
        .providers
        .frankfurter
        .as_ref()
        .map_or("https://api.frankfurter.dev/v1", |p| &p.base_url);
    let provider =
        providers::frankfurter::FrankfurterProvider::new(base_url, &config, Arc::clone(&cache));

    let spinner = ui::new_spinner("Fetching exchange rates...");
    let report = series::get_report(
        &request.start,
        &request.end,
        request.mode,
        &provider,
        &config.quote_currency,
    )
    .await;
    spinner.finish_and_clear();
    let report = report?;

    if request.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let pair = format!("{}/{}", config.base_currency, config.quote_currency);
        println!("{}", report.display_as_table(&pair));
    }

    Ok(())
}
