use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Information about a single satellite from TLE
#[derive(Debug, Clone, Serialize)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u64,
    pub tle_source: String,
}

/// One elevation reading of the satellite as seen from the station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub elevation_deg: f64,
}

/// A contiguous interval above the mask, as found by the pass detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactWindow {
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub tca: DateTime<Utc>,
    pub max_elevation_deg: f64,
    pub duration_s: f64,
    /// Satellite was already above the mask when the analysis interval opened.
    pub aos_truncated: bool,
    /// Satellite was still above the mask when the analysis interval closed.
    pub los_truncated: bool,
}

impl ContactWindow {
    pub fn is_truncated(&self) -> bool {
        self.aos_truncated || self.los_truncated
    }
}

/// A contact window with its estimated data return
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pass {
    #[serde(flatten)]
    pub window: ContactWindow,
    pub estimated_data_mbit: f64,
}

impl Pass {
    pub fn aos(&self) -> DateTime<Utc> {
        self.window.aos
    }

    pub fn duration_s(&self) -> f64 {
        self.window.duration_s
    }

    pub fn estimated_data_mb(&self) -> f64 {
        self.estimated_data_mbit / 8.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub pass_count: usize,
    pub total_contact_s: f64,
    pub total_data_mbit: f64,
    pub max_elevation_deg: f64,
}
