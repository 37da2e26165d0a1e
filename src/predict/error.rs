use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("invalid configuration: {parameter}: {reason}")]
    InvalidConfiguration {
        parameter: &'static str,
        reason: String,
    },
    #[error("geometry unavailable at {instant}: {reason}")]
    GeometryUnavailable {
        instant: DateTime<Utc>,
        reason: String,
    },
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("TLE download from {url} failed: {message}")]
    Fetch { url: String, message: String },
    #[error("Invalid TLE format in {source_name}: {message}")]
    InvalidTle {
        source_name: String,
        message: String,
    },
    #[error("No TLE found in {0}")]
    NoSatellites(String),
}

impl PredictError {
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        PredictError::InvalidConfiguration {
            parameter,
            reason: reason.into(),
        }
    }
}
