use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::chart::component::TankChart;

/// Periodic re-fetch driver for a chart component.
///
/// The timer task is owned outright: stopping or dropping the scheduler
/// aborts it, and interval or fetch-identity changes go through [`restart`],
/// so no orphaned timers outlive the component.
///
/// [`restart`]: RefreshScheduler::restart
pub struct RefreshScheduler {
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Re-fetch `chart` every `interval_seconds`. Zero disables the refresh
    /// entirely. Each tick reads the mode and window current at fire time,
    /// not a snapshot from schedule time.
    #[must_use]
    pub fn start(chart: Arc<TankChart>, interval_seconds: u64) -> Self {
        if interval_seconds == 0 {
            tracing::info!("periodic refresh disabled");
            return Self { handle: None };
        }

        tracing::info!(interval_seconds, "starting refresh scheduler");

        let handle = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(interval_seconds));

            // The interval fires immediately; the mount fetch already covers
            // that, so consume the first tick.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                tracing::debug!("running scheduled refresh");
                chart.fetch_data().await;
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Tear down the current timer and start a fresh one, for when the
    /// refresh interval or the fetch identity changes.
    pub fn restart(&mut self, chart: Arc<TankChart>, interval_seconds: u64) {
        self.stop();
        *self = Self::start(chart, interval_seconds);
    }

    /// Abort the timer task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
