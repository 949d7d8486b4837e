use std::fs;
use std::sync::Arc;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_rates_mock_server(
        range_path: &str,
        mock_response: &str,
    ) -> wiremock::MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(range_path))
            .and(query_param("from", "EUR"))
            .and(query_param("to", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(base_url: &str, fallback_file: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
providers:
  frankfurter:
    base_url: "{base_url}"
cache_ttl_secs: 60
retry_attempts: 2
retry_backoff_secs: 0.01
fallback_file: "{fallback_file}"
base_currency: "EUR"
quote_currency: "USD"
"#,
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

fn summary_request(start: &str, end: &str, mode: fxsum::ReportMode) -> fxsum::SummaryRequest {
    fxsum::SummaryRequest {
        start: start.to_string(),
        end: end.to_string(),
        mode,
        json: false,
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_response = r#"{
        "base": "EUR",
        "rates": {
            "2024-01-01": {"USD": 1.10},
            "2024-01-02": {"USD": 1.11},
            "2024-01-03": {"USD": 1.12}
        }
    }"#;
    let mock_server =
        test_utils::create_rates_mock_server("/2024-01-01..2024-01-03", mock_response).await;
    let config_file = test_utils::write_config(&mock_server.uri(), "does-not-exist.json");

    let result = fxsum::run_summary(
        &summary_request("2024-01-01", "2024-01-03", fxsum::ReportMode::Full),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_fallback_file() {
    // Upstream always fails; the snapshot file serves the data instead.
    let mock_server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fallback_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        fallback_file.path(),
        r#"{"rates": {"2024-01-01": {"USD": 1.05}, "2024-01-02": {"USD": 1.06}}}"#,
    )
    .expect("Failed to write fallback file");

    let config_file = test_utils::write_config(
        &mock_server.uri(),
        fallback_file.path().to_str().unwrap(),
    );

    let result = fxsum::run_summary(
        &summary_request("2024-01-01", "2024-01-02", fxsum::ReportMode::Full),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Fallback flow failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_app_reports_combined_error_when_both_sources_fail() {
    let mock_server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config_file = test_utils::write_config(&mock_server.uri(), "no/such/snapshot.json");

    let result = fxsum::run_summary(
        &summary_request("2024-01-01", "2024-01-02", fxsum::ReportMode::Full),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    info!(?message, "Received combined error");
    assert!(message.contains("Failed to fetch exchange rates from API and fallback"));
    assert!(message.contains("HTTP error: 503"));
    assert!(message.contains("no/such/snapshot.json"));
}

#[test_log::test(tokio::test)]
async fn test_report_pipeline_with_rate_gap() {
    use fxsum::providers::frankfurter::FrankfurterProvider;
    use fxsum::series::{ReportMode, get_report};

    // 2024-01-02 has no reported rate: no percent change is computed into
    // or out of the gap, while the summary still spans the endpoints.
    let mock_response = r#"{
        "rates": {
            "2024-01-01": {"USD": 1.10},
            "2024-01-03": {"USD": 1.12}
        }
    }"#;
    let mock_server =
        test_utils::create_rates_mock_server("/2024-01-01..2024-01-03", mock_response).await;

    let config = fxsum::config::AppConfig::default();
    let cache = Arc::new(fxsum::cache::Cache::new());
    let provider = FrankfurterProvider::new(&mock_server.uri(), &config, cache);

    let report = get_report(
        "2024-01-01",
        "2024-01-03",
        ReportMode::Full,
        &provider,
        "USD",
    )
    .await
    .unwrap();

    assert_eq!(report.days.len(), 3);
    assert_eq!(report.days[0].rate, Some(1.10));
    assert_eq!(report.days[0].pct_change, None);
    assert_eq!(report.days[1].rate, None);
    assert_eq!(report.days[1].pct_change, None);
    assert_eq!(report.days[2].rate, Some(1.12));
    assert_eq!(report.days[2].pct_change, None);

    assert_eq!(report.summary.start_rate, Some(1.10));
    assert_eq!(report.summary.end_rate, Some(1.12));
    let total = report.summary.total_pct_change.unwrap();
    assert!((total - 1.818).abs() < 0.001);
    let mean = report.summary.mean_rate.unwrap();
    assert!((mean - 1.11).abs() < 1e-9);
}

#[test_log::test(tokio::test)]
async fn test_summary_only_mode_omits_days() {
    use fxsum::providers::frankfurter::FrankfurterProvider;
    use fxsum::series::{ReportMode, get_report};

    let mock_response = r#"{"rates": {"2024-01-01": {"USD": 1.10}}}"#;
    let mock_server =
        test_utils::create_rates_mock_server("/2024-01-01..2024-01-01", mock_response).await;

    let config = fxsum::config::AppConfig::default();
    let cache = Arc::new(fxsum::cache::Cache::new());
    let provider = FrankfurterProvider::new(&mock_server.uri(), &config, cache);

    let report = get_report(
        "2024-01-01",
        "2024-01-01",
        ReportMode::SummaryOnly,
        &provider,
        "USD",
    )
    .await
    .unwrap();

    assert!(report.days.is_empty());
    assert_eq!(report.summary.start_rate, Some(1.10));
    assert_eq!(report.summary.end_rate, Some(1.10));
    assert_eq!(report.summary.mean_rate, Some(1.10));
}

#[test_log::test(tokio::test)]
async fn test_invalid_range_is_rejected_before_fetch() {
    use fxsum::providers::frankfurter::FrankfurterProvider;
    use fxsum::series::{ReportMode, get_report};

    let mock_server = wiremock::MockServer::start().await;
    let config = fxsum::config::AppConfig::default();
    let cache = Arc::new(fxsum::cache::Cache::new());
    let provider = FrankfurterProvider::new(&mock_server.uri(), &config, cache);

    let result = get_report(
        "2024-01-05",
        "2024-01-01",
        ReportMode::Full,
        &provider,
        "USD",
    )
    .await;
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "start must be <= end");

    let result = get_report(
        "01/05/2024",
        "2024-01-06",
        ReportMode::Full,
        &provider,
        "USD",
    )
    .await;
    assert!(result.is_err());
    assert_eq!(
        result.unwrap_err().to_string(),
        "Invalid date format. Use YYYY-MM-DD"
    );
}
