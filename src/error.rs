#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Telemetry API error: {0}")]
    TelemetryApi(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

pub type AppResult<T> = Result<T, AppError>;
