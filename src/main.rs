use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tank_chart::chart::{DisplayState, RefreshScheduler, TankChart};
use tank_chart::config::Config;
use tank_chart::telemetry::TelemetryClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tank_chart=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting tank-chart...");

    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    tracing::info!(
        base_url = %config.telemetry_base_url,
        time_range = %config.time_range,
        refresh_interval_seconds = config.refresh_interval_seconds,
        "Configuration loaded"
    );

    // Create telemetry client
    let client = Arc::new(TelemetryClient::new(&config));
    tracing::info!("Telemetry client initialized");

    let chart = Arc::new(TankChart::new(client.clone(), config.time_range));

    // Mount fetch, then hand re-polling to the scheduler
    chart.fetch_data().await;
    report(&chart.display_state());

    match client.latest().await {
        Ok(reading) => tracing::info!(
            level = reading.level,
            status = ?reading.status,
            timestamp = %reading.timestamp,
            "Latest recorded reading"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not fetch latest reading"),
    }

    let mut scheduler = RefreshScheduler::start(chart.clone(), config.refresh_interval_seconds);

    shutdown_signal().await;

    scheduler.stop();
    tracing::info!("Refresh scheduler stopped, shut down gracefully");
    Ok(())
}

fn report(state: &DisplayState) {
    match state {
        DisplayState::Loading => tracing::info!("Chart loading..."),
        DisplayState::Error {
            message,
            stale_points,
        } => tracing::warn!(stale_points = stale_points.len(), "Chart error: {message}"),
        DisplayState::NoData => tracing::info!("No data for the selected range"),
        DisplayState::Chart {
            points,
            current_level,
            ..
        } => tracing::info!(points = points.len(), "Tank level {current_level:.1}%"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
