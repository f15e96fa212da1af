use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Query descriptor for the `/telemetry` read endpoint.
///
/// Exactly one of `{start, end}` or `hours` is populated per call; the range
/// resolver always picks one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub hours: Option<u32>,
    pub limit: u32,
}

impl TelemetryQuery {
    #[must_use]
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>, limit: u32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            hours: None,
            limit,
        }
    }

    #[must_use]
    pub fn last_hours(hours: u32, limit: u32) -> Self {
        Self {
            start: None,
            end: None,
            hours: Some(hours),
            limit,
        }
    }
}

/// Response envelope from `/telemetry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryResponse {
    pub data: Vec<RawPoint>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_points: u64,
}

/// A reading as serialized by the read API. The timestamp stays a string
/// until [`parse_timestamp`] decides how to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPoint {
    pub timestamp: String,
    pub level: f64,
}

/// Response from `/telemetry/latest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestReading {
    pub timestamp: String,
    pub level: f64,
    #[serde(default)]
    pub status: ReadingStatus,
}

/// Freshness classification attached to the latest reading by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    #[default]
    Active,
    /// Older than the service's staleness cutoff.
    Stale,
    /// Served straight from the live feed, not yet persisted.
    Live,
}

/// A parsed instant, tagged with whether its zone was explicit in the
/// serialized form or UTC had to be assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTimestamp {
    Utc(DateTime<Utc>),
    AmbiguousAssumedUtc(DateTime<Utc>),
}

impl ParsedTimestamp {
    #[must_use]
    pub fn instant(self) -> DateTime<Utc> {
        match self {
            Self::Utc(t) | Self::AmbiguousAssumedUtc(t) => t,
        }
    }

    #[must_use]
    pub fn is_ambiguous(self) -> bool {
        matches!(self, Self::AmbiguousAssumedUtc(_))
    }
}

/// Parse a serialized instant from the read API.
///
/// Timestamps without an explicit zone marker get one appended and are read
/// as UTC, never as local time.
///
/// # Errors
///
/// Returns `AppError::InvalidTimestamp` if the string parses neither with nor
/// without a zone marker.
pub fn parse_timestamp(raw: &str) -> AppResult<ParsedTimestamp> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ParsedTimestamp::Utc(t.with_timezone(&Utc)));
    }

    let assumed = format!("{raw}Z");
    DateTime::parse_from_rfc3339(&assumed)
        .map(|t| ParsedTimestamp::AmbiguousAssumedUtc(t.with_timezone(&Utc)))
        .map_err(|e| AppError::InvalidTimestamp(format!("{raw}: {e}")))
}
