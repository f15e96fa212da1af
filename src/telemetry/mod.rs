pub mod client;
pub mod models;
pub mod source;

pub use client::TelemetryClient;
pub use source::TelemetrySource;
