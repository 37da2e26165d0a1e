use chrono::{FixedOffset, Offset, Utc};

use crate::predict::error::PredictError;

// WGS-84
const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
const EARTH_ECCENTRICITY_SQ: f64 = 0.00669437999014;

#[derive(Debug, Clone, PartialEq)]
pub struct GroundStation {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    pub mask_deg: f64,
    /// Offset used when days are bucketed in station-local time.
    pub utc_offset: FixedOffset,
}

impl GroundStation {
    pub fn new(name: &str, latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude_deg,
            longitude_deg,
            altitude_m,
            mask_deg: 0.0,
            utc_offset: Utc.fix(),
        }
    }

    pub fn with_mask(mut self, mask_deg: f64) -> Self {
        self.mask_deg = mask_deg;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Result<Self, PredictError> {
        self.utc_offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                PredictError::invalid("utc_offset_minutes", format!("{} is out of range", minutes))
            })?;
        Ok(self)
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = EARTH_EQUATORIAL_RADIUS_KM / (1.0 - EARTH_ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        [
            (n + alt_km) * cos_lat * lon.cos(),
            (n + alt_km) * cos_lat * lon.sin(),
            (n * (1.0 - EARTH_ECCENTRICITY_SQ) + alt_km) * sin_lat,
        ]
    }

    pub fn validate(&self) -> Result<(), PredictError> {
        if !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(PredictError::invalid(
                "lat_deg",
                format!("{} is outside [-90, 90] for station {}", self.latitude_deg, self.name),
            ));
        }
        if !(-90.0..=90.0).contains(&self.mask_deg) {
            return Err(PredictError::invalid(
                "mask_deg",
                format!("{} is outside [-90, 90] for station {}", self.mask_deg, self.name),
            ));
        }
        Ok(())
    }
}
