use async_trait::async_trait;

use crate::error::AppResult;
use crate::telemetry::models::{TelemetryQuery, TelemetryResponse};

/// Read-side seam over the telemetry API.
///
/// The chart core only ever issues queries through this trait, so tests can
/// drive it with a scripted source instead of the HTTP client.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch readings matching `query`, ordered oldest first.
    async fn query(&self, query: &TelemetryQuery) -> AppResult<TelemetryResponse>;
}
