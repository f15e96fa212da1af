//! Shared test helpers: a scripted telemetry source and response builders.
#![allow(dead_code)] // not every test binary uses every helper

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tank_chart::error::{AppError, AppResult};
use tank_chart::telemetry::TelemetrySource;
use tank_chart::telemetry::models::{RawPoint, TelemetryQuery, TelemetryResponse};

/// Serves scripted responses in order and records every query for
/// assertions. Once the script runs out, further queries get empty results.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<AppResult<TelemetryResponse>>>,
    queries: Mutex<Vec<TelemetryQuery>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<AppResult<TelemetryResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<TelemetryQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl TelemetrySource for ScriptedSource {
    async fn query(&self, query: &TelemetryQuery) -> AppResult<TelemetryResponse> {
        self.queries.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(response(&[])))
    }
}

pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("test timestamp must parse")
}

pub fn response(points: &[(&str, f64)]) -> TelemetryResponse {
    TelemetryResponse {
        data: points
            .iter()
            .map(|(timestamp, level)| RawPoint {
                timestamp: (*timestamp).to_string(),
                level: *level,
            })
            .collect(),
        start_time: None,
        end_time: None,
        total_points: points.len() as u64,
    }
}

pub fn data(points: &[(&str, f64)]) -> AppResult<TelemetryResponse> {
    Ok(response(points))
}

pub fn empty() -> AppResult<TelemetryResponse> {
    Ok(response(&[]))
}

pub fn failure(message: &str) -> AppResult<TelemetryResponse> {
    Err(AppError::TelemetryApi(message.to_string()))
}
