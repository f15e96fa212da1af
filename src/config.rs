use std::env;

use crate::chart::model::TimeRange;

#[derive(Debug, Clone)]
pub struct Config {
    // Telemetry read API
    pub telemetry_base_url: String,
    pub request_timeout_seconds: u64,

    // Chart settings
    pub time_range: TimeRange,
    pub refresh_interval_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are
    /// not set, or `ConfigError::Invalid` if `TIME_RANGE` is neither a
    /// positive hour count nor `all`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            // Telemetry read API
            telemetry_base_url: env::var("TELEMETRY_BASE_URL")
                .map_err(|_| ConfigError::Missing("TELEMETRY_BASE_URL"))?,
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),

            // Chart settings
            time_range: env::var("TIME_RANGE")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("TIME_RANGE"))?,
            // 0 disables the periodic refresh
            refresh_interval_seconds: env::var("REFRESH_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
