use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

/// One chart-ready sample. Level is a fill percentage (0-100).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryPoint {
    pub timestamp: DateTime<Utc>,
    pub level: f64,
}

/// Visible time range in all-time mode. `start` always precedes `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start < end, "window start must precede end");
        Self { start, end }
    }

    /// Window of the given size ending at `end`.
    #[must_use]
    pub fn ending_at(end: DateTime<Utc>, size: Duration) -> Self {
        Self::new(end - size, end)
    }

    /// Window of the given size starting at `start`.
    #[must_use]
    pub fn anchored_at(start: DateTime<Utc>, size: Duration) -> Self {
        Self::new(start, start + size)
    }

    #[must_use]
    pub fn size(&self) -> Duration {
        self.end - self.start
    }

    /// Both edges moved by `delta`, size preserved.
    #[must_use]
    pub fn shifted(&self, delta: Duration) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

/// Active display mode. Exactly one is in effect at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Most recent N hours, resolved relative to "now" by the read API.
    FixedHours(u32),
    /// Explicit, user-navigable window.
    AllTime(TimeWindow),
}

/// Time range selection exposed to the page chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    LastHours(u32),
    All,
}

impl FromStr for TimeRange {
    type Err = ParseTimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<u32>() {
            Ok(hours) if hours > 0 => Ok(Self::LastHours(hours)),
            _ => Err(ParseTimeRangeError(s.to_string())),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastHours(hours) => write!(f, "{hours}h"),
            Self::All => write!(f, "all"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("time range must be a positive hour count or \"all\", got {0:?}")]
pub struct ParseTimeRangeError(String);

/// Pan direction for all-time window navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Earlier,
    Later,
}

/// Mutable fetch lifecycle state backing the chart.
///
/// Created empty on mount and on mode change, set to loading on every fetch
/// attempt, and overwritten wholesale on every successful fetch.
#[derive(Debug, Clone)]
pub struct FetchState {
    /// Samples sorted ascending by timestamp (upstream ordering guarantee).
    pub points: Vec<TelemetryPoint>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    /// Whether backward navigation is still offered; cleared when a pan pins
    /// the window at the earliest recorded data.
    pub has_earlier_data: bool,
}

impl FetchState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            loading: true,
            error: None,
            last_update: None,
            has_earlier_data: true,
        }
    }
}

impl Default for FetchState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the page chrome should render.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    /// Initial load with nothing to show yet.
    Loading,
    /// Retryable failure. Points from the last successful fetch stay visible
    /// rather than blanking the chart.
    Error {
        message: String,
        stale_points: Vec<TelemetryPoint>,
    },
    /// Successful fetch, empty range.
    NoData,
    Chart {
        points: Vec<TelemetryPoint>,
        /// Level of the most recent sample, for the readout.
        current_level: f64,
        last_update: Option<DateTime<Utc>>,
        /// Pan/reset controls, present only in all-time mode.
        navigation: Option<Navigation>,
    },
}

/// Window navigation control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub earlier_enabled: bool,
}
