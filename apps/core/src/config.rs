use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a sensible default; `.env` is honored when present.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote prediction API.
    pub api_base_url: String,
    /// Where the persisted store lives. `None` keeps everything in memory.
    pub storage_path: Option<PathBuf>,
    pub min_password_len: usize,
    pub request_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: env_or("MEDAI_API_URL", "http://localhost:5000/api"),
            storage_path: std::env::var("MEDAI_STORAGE_PATH").ok().map(PathBuf::from),
            min_password_len: env_or("MEDAI_MIN_PASSWORD_LEN", "6")
                .parse::<usize>()
                .context("MEDAI_MIN_PASSWORD_LEN must be a positive integer")?,
            request_timeout: Duration::from_secs(
                env_or("MEDAI_REQUEST_TIMEOUT_SECS", "10")
                    .parse::<u64>()
                    .context("MEDAI_REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            ),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            storage_path: None,
            min_password_len: 6,
            request_timeout: Duration::from_secs(10),
            rust_log: "info".to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.min_password_len, 6);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.storage_path.is_none());
    }
}
