//! First-run configuration bootstrap.

use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"---
providers:
  nse:
    base_url: "https://www.nseindia.com"
  yahoo:
    base_url: "https://query1.finance.yahoo.com"

fetch:
  cache_ttl_secs: 60
  workers: 10
  deadline_secs: 30
  request_timeout_secs: 10

currency: "INR"
"#;

/// Writes the default configuration file at the default location.
pub fn run() -> Result<()> {
    run_at_path(AppConfig::default_config_path()?)
}

/// Writes the default configuration file at the given path. Refuses to
/// overwrite an existing file.
pub fn run_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    println!("Created default configuration at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_setup_writes_a_loadable_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        run_at_path(&path).unwrap();
        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.fetch.cache_ttl_secs, 60);
        assert_eq!(config.currency, "INR");
    }

    #[test]
    fn test_setup_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        run_at_path(&path).unwrap();
        let err = run_at_path(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
