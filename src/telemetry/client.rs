use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::telemetry::models::{LatestReading, TelemetryQuery, TelemetryResponse};
use crate::telemetry::source::TelemetrySource;

pub struct TelemetryClient {
    http_client: Client,
    base_url: String,
}

impl TelemetryClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: config.telemetry_base_url.clone(),
        }
    }

    fn telemetry_url(&self, query: &TelemetryQuery) -> String {
        // Timestamps go out with a Z suffix rather than a +00:00 offset, so
        // the query string needs no percent-encoding.
        let mut url = format!("{}/telemetry?limit={}", self.base_url, query.limit);
        if let Some(hours) = query.hours {
            url.push_str(&format!("&hours={hours}"));
        }
        if let Some(start) = query.start {
            url.push_str(&format!(
                "&start_time={}",
                start.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        if let Some(end) = query.end {
            url.push_str(&format!(
                "&end_time={}",
                end.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        url
    }

    /// Get the most recent reading with its freshness status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::TelemetryApi` if the request fails or returns an
    /// error status.
    pub async fn latest(&self) -> AppResult<LatestReading> {
        let url = format!("{}/telemetry/latest", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::TelemetryApi(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::TelemetryApi(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::TelemetryApi(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl TelemetrySource for TelemetryClient {
    /// Get readings for a time range or a relative hour span.
    ///
    /// # Errors
    ///
    /// Returns `AppError::TelemetryApi` if the request fails or returns an
    /// error status.
    async fn query(&self, query: &TelemetryQuery) -> AppResult<TelemetryResponse> {
        let url = self.telemetry_url(query);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::TelemetryApi(format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::TelemetryApi("Rate limited (429)".to_string()));
        }

        if !response.status().is_success() {
            return Err(AppError::TelemetryApi(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::TelemetryApi(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse telemetry response"
            );
            AppError::TelemetryApi(format!("Failed to parse response: {e}"))
        })
    }
}
