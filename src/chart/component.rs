use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::chart::model::{
    DisplayState, FetchState, Mode, Navigation, PanDirection, TelemetryPoint, TimeRange,
    TimeWindow,
};
use crate::chart::range;
use crate::error::{AppError, AppResult};
use crate::telemetry::models::{self, RawPoint, TelemetryQuery};
use crate::telemetry::TelemetrySource;

/// Hard floor for the earliest-data probe; no recorded data predates the
/// service going live.
const PROBE_FLOOR_EPOCH: i64 = 1_577_836_800; // 2020-01-01T00:00:00Z

/// Result cap for the earliest-data probe; only the first hit matters.
const PROBE_LIMIT: u32 = 10;

/// Initial window size when entering all-time mode.
const DEFAULT_ALL_WINDOW_DAYS: i64 = 30;

fn probe_floor() -> DateTime<Utc> {
    DateTime::from_timestamp(PROBE_FLOOR_EPOCH, 0).expect("probe floor epoch is valid")
}

enum FetchOutcome {
    Settled,
    /// The probe re-anchored the window; nothing was committed and the
    /// corrected range still needs fetching.
    WindowMoved,
}

#[derive(Debug)]
struct ChartState {
    mode: Mode,
    fetch: FetchState,
}

/// The chart-backing component: resolves the active mode into queries, runs
/// fetches against a [`TelemetrySource`], and navigates the all-time window.
///
/// State lives behind a mutex that is never held across an await. Overlapping
/// invocations (a user pan racing a scheduled refresh) are resolved by a
/// monotonically increasing request token: a response is applied only if its
/// token is still the latest issued.
pub struct TankChart {
    source: Arc<dyn TelemetrySource>,
    state: Mutex<ChartState>,
    fetch_seq: AtomicU64,
}

impl TankChart {
    #[must_use]
    pub fn new(source: Arc<dyn TelemetrySource>, time_range: TimeRange) -> Self {
        Self {
            source,
            state: Mutex::new(ChartState {
                mode: Self::mode_for(time_range),
                fetch: FetchState::new(),
            }),
            fetch_seq: AtomicU64::new(0),
        }
    }

    fn mode_for(time_range: TimeRange) -> Mode {
        match time_range {
            TimeRange::LastHours(hours) => Mode::FixedHours(hours),
            TimeRange::All => Mode::AllTime(TimeWindow::ending_at(
                Utc::now(),
                Duration::days(DEFAULT_ALL_WINDOW_DAYS),
            )),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.state().mode
    }

    /// Current all-time window, `None` in fixed-hours mode.
    #[must_use]
    pub fn window(&self) -> Option<TimeWindow> {
        match self.state().mode {
            Mode::AllTime(window) => Some(window),
            Mode::FixedHours(_) => None,
        }
    }

    #[must_use]
    pub fn fetch_state(&self) -> FetchState {
        self.state().fetch.clone()
    }

    /// Switch between fixed-hours and all-time display. Resets fetch state,
    /// then fetches the new range.
    pub async fn set_time_range(&self, time_range: TimeRange) {
        {
            let mut st = self.state();
            st.mode = Self::mode_for(time_range);
            st.fetch = FetchState::new();
        }
        self.fetch_data().await;
    }

    /// Fetch readings for the current mode and window, updating fetch state.
    ///
    /// Also the manual retry control: a failed fetch leaves previous points
    /// in place, and calling this again starts from a clean error slate.
    pub async fn fetch_data(&self) {
        let mut allow_probe = true;
        // When the probe re-anchors the window, run the normal fetch path once
        // more against the corrected range, without probing again.
        while let FetchOutcome::WindowMoved = self.fetch_once(allow_probe).await {
            allow_probe = false;
        }
    }

    async fn fetch_once(&self, allow_probe: bool) -> FetchOutcome {
        let token = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let (query, mode) = {
            let mut st = self.state();
            st.fetch.loading = true;
            st.fetch.error = None;
            (range::resolve_query(&st.mode), st.mode)
        };

        let result = self.source.query(&query).await;

        match result.and_then(|response| map_points(&response.data)) {
            Ok(points) => {
                if points.is_empty()
                    && allow_probe
                    && let Mode::AllTime(window) = mode
                {
                    return self.probe_and_reanchor(window, token).await;
                }
                self.commit_points(points, token);
                FetchOutcome::Settled
            }
            Err(e) => {
                self.commit_error(&e, token);
                FetchOutcome::Settled
            }
        }
    }

    /// Empty all-time window: look for the earliest recorded data and move
    /// the window there, keeping its size. Nothing is committed on a hit; the
    /// caller re-fetches the corrected range.
    async fn probe_and_reanchor(&self, window: TimeWindow, token: u64) -> FetchOutcome {
        match self.probe_earliest().await {
            Ok(Some(earliest)) => {
                let moved = TimeWindow::anchored_at(earliest, window.size());
                let mut st = self.state();
                if self.fetch_seq.load(Ordering::SeqCst) != token {
                    tracing::debug!(token, "discarding stale probe result");
                    return FetchOutcome::Settled;
                }
                tracing::info!(
                    start = %moved.start,
                    end = %moved.end,
                    "no data in window, re-anchored to earliest recorded data"
                );
                st.mode = Mode::AllTime(moved);
                FetchOutcome::WindowMoved
            }
            Ok(None) => {
                self.commit_points(Vec::new(), token);
                FetchOutcome::Settled
            }
            Err(e) => {
                self.commit_error(&e, token);
                FetchOutcome::Settled
            }
        }
    }

    /// Wide-range, low-limit query to discover the earliest recorded sample.
    async fn probe_earliest(&self) -> AppResult<Option<DateTime<Utc>>> {
        let query = TelemetryQuery::range(probe_floor(), Utc::now(), PROBE_LIMIT);
        let response = self.source.query(&query).await?;
        match response.data.first() {
            Some(first) => Ok(Some(models::parse_timestamp(&first.timestamp)?.instant())),
            None => Ok(None),
        }
    }

    fn commit_points(&self, points: Vec<TelemetryPoint>, token: u64) {
        if !points.is_sorted_by_key(|p| p.timestamp) {
            tracing::warn!("telemetry points arrived out of order, chart assumes ascending timestamps");
        }
        let mut st = self.state();
        if self.fetch_seq.load(Ordering::SeqCst) != token {
            tracing::debug!(token, "discarding stale fetch response");
            return;
        }
        tracing::debug!(points = points.len(), "fetch committed");
        st.fetch.points = points;
        st.fetch.loading = false;
        st.fetch.last_update = Some(Utc::now());
    }

    fn commit_error(&self, error: &AppError, token: u64) {
        let mut st = self.state();
        if self.fetch_seq.load(Ordering::SeqCst) != token {
            tracing::debug!(token, "discarding stale fetch failure");
            return;
        }
        tracing::error!(error = %error, "telemetry fetch failed");
        // Prior points stay visible; stale data beats a blank chart.
        st.fetch.error = Some(error.to_string());
        st.fetch.loading = false;
    }

    /// Shift the all-time window by half its size, then re-fetch. No-op in
    /// fixed-hours mode.
    ///
    /// Backward pans are guarded by a `limit = 1` existence check so that
    /// panning past the true data boundary pins the window at the earliest
    /// recorded data instead of silently rendering an empty chart.
    pub async fn pan(&self, direction: PanDirection) {
        let Some(window) = self.window() else {
            tracing::debug!("pan ignored outside all-time mode");
            return;
        };
        let half = window.size() / 2;

        match direction {
            PanDirection::Later => {
                // Moving forward can only move away from any floor previously
                // hit, so earlier navigation is re-enabled.
                self.commit_window(window.shifted(half), Some(true));
            }
            PanDirection::Earlier => {
                self.pan_earlier(window.shifted(-half)).await;
            }
        }

        self.fetch_data().await;
    }

    async fn pan_earlier(&self, tentative: TimeWindow) {
        let check = TelemetryQuery::range(tentative.start, tentative.end, 1);
        match self.source.query(&check).await {
            Ok(response) if !response.data.is_empty() => {
                self.commit_window(tentative, Some(true));
            }
            Ok(_) => match self.probe_earliest().await {
                Ok(Some(earliest)) => {
                    let pinned = TimeWindow::anchored_at(earliest, tentative.size());
                    tracing::info!(start = %pinned.start, "reached earliest recorded data, pinning window");
                    self.commit_window(pinned, Some(false));
                }
                Ok(None) => {
                    // Nothing recorded anywhere; commit the shift anyway
                    // rather than freezing navigation.
                    self.commit_window(tentative, None);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "earliest-data probe failed during pan, committing unguarded window");
                    self.commit_window(tentative, None);
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "existence check failed during pan, committing unguarded window");
                self.commit_window(tentative, None);
            }
        }
    }

    fn commit_window(&self, window: TimeWindow, has_earlier_data: Option<bool>) {
        let mut st = self.state();
        // Mode may have switched while a check was in flight.
        if !matches!(st.mode, Mode::AllTime(_)) {
            return;
        }
        st.mode = Mode::AllTime(window);
        if let Some(flag) = has_earlier_data {
            st.fetch.has_earlier_data = flag;
        }
    }

    /// Recentre the all-time window on the current instant, preserving its
    /// size, then re-fetch. No-op in fixed-hours mode.
    pub async fn reset_to_now(&self) {
        let Some(window) = self.window() else {
            return;
        };
        // Jumping to now moves away from any pinned floor, like a forward pan.
        self.commit_window(TimeWindow::ending_at(Utc::now(), window.size()), Some(true));
        self.fetch_data().await;
    }

    /// Derive what the page chrome should render from the current state.
    #[must_use]
    pub fn display_state(&self) -> DisplayState {
        let st = self.state();
        if let Some(message) = &st.fetch.error {
            return DisplayState::Error {
                message: message.clone(),
                stale_points: st.fetch.points.clone(),
            };
        }
        if st.fetch.loading && st.fetch.points.is_empty() {
            return DisplayState::Loading;
        }
        match st.fetch.points.last() {
            None => DisplayState::NoData,
            Some(latest) => DisplayState::Chart {
                current_level: latest.level,
                points: st.fetch.points.clone(),
                last_update: st.fetch.last_update,
                navigation: match st.mode {
                    Mode::AllTime(_) => Some(Navigation {
                        earlier_enabled: st.fetch.has_earlier_data,
                    }),
                    Mode::FixedHours(_) => None,
                },
            },
        }
    }
}

/// Map raw readings into chart points, parsing timestamps as UTC.
fn map_points(raw: &[RawPoint]) -> AppResult<Vec<TelemetryPoint>> {
    let mut assumed_utc = 0usize;
    let points = raw
        .iter()
        .map(|point| {
            let parsed = models::parse_timestamp(&point.timestamp)?;
            if parsed.is_ambiguous() {
                assumed_utc += 1;
            }
            Ok(TelemetryPoint {
                timestamp: parsed.instant(),
                level: point.level,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    if assumed_utc > 0 {
        tracing::debug!(assumed_utc, "timestamps lacked a zone marker, read as UTC");
    }
    Ok(points)
}
