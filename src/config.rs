use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::predict::{
    parse_inline, AnalysisWindow, DayBoundary, GroundStation, LinkModel, PassParams,
    PredictError, TleEntry, TleLoader,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0}")]
    Invalid(#[from] PredictError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub time: TimeConfig,
    pub link: LinkModel,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub satellites: Vec<SatelliteConfig>,
    pub ground_stations: Vec<StationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeConfig {
    #[serde(deserialize_with = "deserialize_datetime")]
    pub start_utc: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub end_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub min_pass_duration_s: f64,
    #[serde(
        default = "default_sample_step",
        deserialize_with = "deserialize_duration"
    )]
    pub sample_step: Duration,
    #[serde(default)]
    pub default_mask_deg: f64,
    #[serde(default)]
    pub day_boundary: DayBoundary,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_pass_duration_s: 0.0,
            sample_step: default_sample_step(),
            default_mask_deg: 0.0,
            day_boundary: DayBoundary::default(),
        }
    }
}

impl AnalysisConfig {
    /// Human-readable sample step, e.g. `10s` or `500ms`.
    pub fn sample_step_label(&self) -> String {
        match self.sample_step.to_std() {
            Ok(step) => humantime::format_duration(step).to_string(),
            Err(_) => self.sample_step.to_string(),
        }
    }
}

fn default_sample_step() -> Duration {
    Duration::seconds(10)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SatelliteConfig {
    pub name: String,
    #[serde(flatten)]
    pub tle: TleSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TleSource {
    File { tle_file: PathBuf },
    Url { tle_url: String },
    Inline { tle1: String, tle2: String },
}

impl SatelliteConfig {
    pub fn load(&self) -> Result<TleEntry, PredictError> {
        match &self.tle {
            TleSource::File { tle_file } => TleLoader::from_file(tle_file)?.select(&self.name),
            TleSource::Url { tle_url } => TleLoader::from_url(tle_url)?.select(&self.name),
            TleSource::Inline { tle1, tle2 } => parse_inline(&self.name, tle1, tle2),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: String,
    pub lat_deg: f64,
    pub lon_deg: f64,
    #[serde(default)]
    pub alt_m: f64,
    #[serde(default)]
    pub mask_deg: Option<f64>,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn analysis_window(&self) -> AnalysisWindow {
        AnalysisWindow {
            start: self.time.start_utc,
            end: self.time.end_utc,
            step: self.analysis.sample_step,
        }
    }

    pub fn ground_station(&self, station: &StationConfig) -> Result<GroundStation, PredictError> {
        let ground_station =
            GroundStation::new(&station.name, station.lat_deg, station.lon_deg, station.alt_m)
                .with_mask(station.mask_deg.unwrap_or(self.analysis.default_mask_deg))
                .with_utc_offset_minutes(station.utc_offset_minutes)?;
        ground_station.validate()?;
        Ok(ground_station)
    }

    pub fn pass_params(&self, station: &GroundStation) -> PassParams {
        PassParams {
            mask_deg: station.mask_deg,
            min_pass_duration_s: self.analysis.min_pass_duration_s,
        }
    }

    /// Checks everything that can be checked without touching TLE files.
    pub fn validate(&self) -> Result<(), PredictError> {
        if self.time.end_utc <= self.time.start_utc {
            return Err(PredictError::invalid(
                "time",
                format!(
                    "end_utc {} is not after start_utc {}",
                    self.time.end_utc, self.time.start_utc
                ),
            ));
        }
        if self.analysis.sample_step <= Duration::zero() {
            return Err(PredictError::invalid(
                "sample_step",
                "step must be positive",
            ));
        }
        if self.satellites.is_empty() {
            return Err(PredictError::invalid("satellites", "no satellites configured"));
        }
        if self.ground_stations.is_empty() {
            return Err(PredictError::invalid(
                "ground_stations",
                "no ground stations configured",
            ));
        }
        for station in &self.ground_stations {
            let ground_station = self.ground_station(station)?;
            self.pass_params(&ground_station).validate()?;
        }
        Ok(())
    }
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim())
        .map_err(serde::de::Error::custom)
        .and_then(|d| Duration::from_std(d).map_err(serde::de::Error::custom))
}
