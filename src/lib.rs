//! Tank Chart - fetch and time-window core for tank level telemetry
//!
//! This library exposes the core modules for testing and reuse.

pub mod chart;
pub mod config;
pub mod error;
pub mod telemetry;
