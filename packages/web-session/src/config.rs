use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub notification_cache_ttl: Duration,
    pub toast_duration: Duration,
    /// Start signed in as the fixed development user.
    pub mock_logged_in: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            api_timeout: gallery_client::DEFAULT_TIMEOUT,
            notification_cache_ttl: crate::notifications::DEFAULT_TTL,
            toast_duration: crate::notifications::DEFAULT_TOAST_DURATION,
            mock_logged_in: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            api_base_url: lookup("API_BASE_URL").unwrap_or(defaults.api_base_url),
            api_timeout: match lookup("API_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(
                    v.parse().context("API_TIMEOUT_SECS must be a valid number")?,
                ),
                None => defaults.api_timeout,
            },
            notification_cache_ttl: match lookup("NOTIFICATION_CACHE_TTL_SECS") {
                Some(v) => Duration::from_secs(
                    v.parse()
                        .context("NOTIFICATION_CACHE_TTL_SECS must be a valid number")?,
                ),
                None => defaults.notification_cache_ttl,
            },
            toast_duration: match lookup("TOAST_DURATION_MS") {
                Some(v) => Duration::from_millis(
                    v.parse().context("TOAST_DURATION_MS must be a valid number")?,
                ),
                None => defaults.toast_duration,
            },
            mock_logged_in: lookup("MOCK_LOGGED_IN").is_some_and(|v| v == "true"),
        })
    }
}
