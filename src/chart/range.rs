use crate::chart::model::Mode;
use crate::telemetry::models::TelemetryQuery;

/// Point cap for chart fetches.
pub const CHART_POINT_LIMIT: u32 = 1000;

/// Translate the active mode into a concrete read-API query.
///
/// Fixed-hours mode queries relative to "now" and lets the service resolve
/// the range; all-time mode pins explicit window edges.
#[must_use]
pub fn resolve_query(mode: &Mode) -> TelemetryQuery {
    match mode {
        Mode::FixedHours(hours) => TelemetryQuery::last_hours(*hours, CHART_POINT_LIMIT),
        Mode::AllTime(window) => TelemetryQuery::range(window.start, window.end, CHART_POINT_LIMIT),
    }
}
