use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NseProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub nse: Option<NseProviderConfig>,
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            nse: Some(NseProviderConfig {
                base_url: "https://www.nseindia.com".to_string(),
            }),
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

/// Tuning for the price-fetch subsystem.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FetchConfig {
    /// Quote cache validity in seconds, clamped to 10-300 at use.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Concurrent fetch workers for a batch.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Overall deadline for one batch fetch, in seconds.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_workers() -> usize {
    10
}

fn default_deadline_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            cache_ttl_secs: default_cache_ttl_secs(),
            workers: default_workers(),
            deadline_secs: default_deadline_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            fetch: FetchConfig::default(),
            currency: default_currency(),
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "eqtrack", "eqtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "eqtrack", "eqtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
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
  nse:
    base_url: "http://example.com/nse"
  yahoo:
    base_url: "http://example.com/yahoo"
fetch:
  cache_ttl_secs: 120
  workers: 4
currency: "INR"
data_path: "/tmp/eqtrack-test"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.nse.unwrap().base_url,
            "http://example.com/nse"
        );
        assert_eq!(
            config.providers.yahoo.unwrap().base_url,
            "http://example.com/yahoo"
        );
        assert_eq!(config.fetch.cache_ttl_secs, 120);
        assert_eq!(config.fetch.workers, 4);
        // Unset fields fall back to defaults
        assert_eq!(config.fetch.deadline_secs, 30);
        assert_eq!(config.fetch.request_timeout_secs, 10);
        assert_eq!(config.currency, "INR");
        assert_eq!(config.data_path.as_deref(), Some("/tmp/eqtrack-test"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("currency: \"INR\"").unwrap();
        assert!(config.providers.nse.is_some());
        assert!(config.providers.yahoo.is_some());
        assert_eq!(config.fetch.cache_ttl_secs, 60);
        assert_eq!(config.fetch.workers, 10);
        assert!(config.data_path.is_none());
    }
}
