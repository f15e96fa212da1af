//! Model and wire-format tests: timestamp parsing, range resolution,
//! response envelopes, and window arithmetic.
//!
//! Run with: cargo test --test model_test

use chrono::Duration;

use tank_chart::chart::model::{Mode, TimeRange, TimeWindow};
use tank_chart::chart::range::{CHART_POINT_LIMIT, resolve_query};
use tank_chart::telemetry::models::{
    LatestReading, ParsedTimestamp, ReadingStatus, TelemetryResponse, parse_timestamp,
};

fn ts(s: &str) -> chrono::DateTime<chrono::Utc> {
    s.parse().expect("test timestamp must parse")
}

#[test]
fn explicit_utc_marker_parses_as_unambiguous() {
    let parsed = parse_timestamp("2024-03-01T06:30:00Z").unwrap();
    assert_eq!(parsed, ParsedTimestamp::Utc(ts("2024-03-01T06:30:00Z")));
    assert!(!parsed.is_ambiguous());
}

#[test]
fn explicit_offset_is_converted_to_utc() {
    let parsed = parse_timestamp("2024-03-01T08:30:00+02:00").unwrap();
    assert_eq!(parsed.instant(), ts("2024-03-01T06:30:00Z"));
    assert!(!parsed.is_ambiguous());
}

#[test]
fn missing_zone_marker_is_assumed_utc_and_tagged() {
    let parsed = parse_timestamp("2024-03-01T06:30:00").unwrap();
    assert_eq!(
        parsed,
        ParsedTimestamp::AmbiguousAssumedUtc(ts("2024-03-01T06:30:00Z"))
    );
    assert!(parsed.is_ambiguous());
}

#[test]
fn fractional_seconds_parse_either_way() {
    assert_eq!(
        parse_timestamp("2024-03-01T06:30:00.250Z").unwrap().instant(),
        parse_timestamp("2024-03-01T06:30:00.250").unwrap().instant(),
    );
}

#[test]
fn garbage_timestamp_is_an_error() {
    let err = parse_timestamp("yesterday-ish").unwrap_err();
    assert!(err.to_string().contains("Invalid timestamp"));
}

#[test]
fn fixed_hours_resolves_to_a_relative_query() {
    let query = resolve_query(&Mode::FixedHours(48));
    assert_eq!(query.hours, Some(48));
    assert_eq!(query.start, None);
    assert_eq!(query.end, None);
    assert_eq!(query.limit, CHART_POINT_LIMIT);
}

#[test]
fn all_time_resolves_to_explicit_window_edges() {
    let window = TimeWindow::new(ts("2024-01-01T00:00:00Z"), ts("2024-02-01T00:00:00Z"));
    let query = resolve_query(&Mode::AllTime(window));
    assert_eq!(query.start, Some(window.start));
    assert_eq!(query.end, Some(window.end));
    assert_eq!(query.hours, None);
    assert_eq!(query.limit, CHART_POINT_LIMIT);
}

#[test]
fn window_arithmetic_preserves_size() {
    let window = TimeWindow::new(ts("2024-01-01T00:00:00Z"), ts("2024-01-31T00:00:00Z"));
    let shifted = window.shifted(Duration::days(-15));
    assert_eq!(shifted.size(), window.size());
    assert_eq!(shifted.start, ts("2023-12-17T00:00:00Z"));

    let anchored = TimeWindow::anchored_at(ts("2023-05-01T00:00:00Z"), window.size());
    assert_eq!(anchored.size(), window.size());
    assert_eq!(anchored.end, ts("2023-05-31T00:00:00Z"));
}

#[test]
fn time_range_parses_hours_and_all() {
    assert_eq!("24".parse::<TimeRange>().unwrap(), TimeRange::LastHours(24));
    assert_eq!("all".parse::<TimeRange>().unwrap(), TimeRange::All);
    assert_eq!("ALL".parse::<TimeRange>().unwrap(), TimeRange::All);
    assert!("0".parse::<TimeRange>().is_err());
    assert!("-3".parse::<TimeRange>().is_err());
    assert!("soon".parse::<TimeRange>().is_err());
}

#[test]
fn telemetry_response_envelope_deserializes() {
    let body = r#"{
        "data": [
            {"timestamp": "2024-03-01T00:00:00Z", "level": 41.0},
            {"timestamp": "2024-03-01T12:00:00", "level": 44.5}
        ],
        "start_time": "2024-03-01T00:00:00Z",
        "end_time": "2024-03-02T00:00:00Z",
        "total_points": 2
    }"#;
    let response: TelemetryResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.data.len(), 2);
    assert_eq!(response.total_points, 2);
    assert_eq!(response.data[1].level, 44.5);
}

#[test]
fn envelope_metadata_fields_are_optional() {
    let response: TelemetryResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
    assert!(response.data.is_empty());
    assert_eq!(response.start_time, None);
    assert_eq!(response.total_points, 0);
}

#[test]
fn latest_reading_status_deserializes() {
    let reading: LatestReading = serde_json::from_str(
        r#"{"timestamp": "2024-03-01T00:00:00Z", "level": 47.0, "status": "stale"}"#,
    )
    .unwrap();
    assert_eq!(reading.status, ReadingStatus::Stale);

    let reading: LatestReading =
        serde_json::from_str(r#"{"timestamp": "2024-03-01T00:00:00Z", "level": 47.0}"#).unwrap();
    assert_eq!(reading.status, ReadingStatus::Active);
}
