use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FrankfurterProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub frankfurter: Option<FrankfurterProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            frankfurter: Some(FrankfurterProviderConfig {
                base_url: "https://api.frankfurter.dev/v1".to_string(),
            }),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_retry_attempts() -> usize {
    3
}

fn default_retry_backoff_secs() -> f64 {
    0.5
}

fn default_fallback_file() -> PathBuf {
    PathBuf::from("data/sample_rates.json")
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_quote_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Lifetime of a cached upstream payload, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Number of upstream attempts before falling back to the snapshot file.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,
    /// Base delay for exponential backoff between attempts, in seconds.
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: f64,
    /// Local snapshot used when the upstream is unreachable.
    #[serde(default = "default_fallback_file")]
    pub fallback_file: PathBuf,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_secs: default_retry_backoff_secs(),
            fallback_file: default_fallback_file(),
            base_currency: default_base_currency(),
            quote_currency: default_quote_currency(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "fxsum")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  frankfurter:
    base_url: "http://example.com/frank"
cache_ttl_secs: 120
retry_attempts: 5
retry_backoff_secs: 0.25
fallback_file: "snapshots/eur_usd.json"
base_currency: "EUR"
quote_currency: "GBP"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.frankfurter.unwrap().base_url,
            "http://example.com/frank"
        );
        assert_eq!(config.cache_ttl_secs, 120);
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.retry_backoff_secs, 0.25);
        assert_eq!(
            config.fallback_file,
            PathBuf::from("snapshots/eur_usd.json")
        );
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.quote_currency, "GBP");
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(
            config.providers.frankfurter.unwrap().base_url,
            "https://api.frankfurter.dev/v1"
        );
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_backoff_secs, 0.5);
        assert_eq!(
            config.fallback_file,
            PathBuf::from("data/sample_rates.json")
        );
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.quote_currency, "USD");
    }
}
