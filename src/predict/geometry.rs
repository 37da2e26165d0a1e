use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::GroundStation;

/// Anything that can tell where a satellite sits above a station's horizon.
///
/// The pass detector only ever needs elevation, so this is the single seam
/// between the windowing core and the propagation backend. Implementations
/// must be deterministic for a given instant.
pub trait ElevationSource {
    fn elevation_at(&self, instant: DateTime<Utc>) -> Result<f64, PredictError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// SGP4-backed geometry for one satellite/station pair.
pub struct Sgp4Geometry<'a> {
    station: GroundStation,
    elements: &'a Elements,
    constants: Constants,
}

impl<'a> Sgp4Geometry<'a> {
    pub fn new(station: GroundStation, elements: &'a Elements) -> Result<Self, PredictError> {
        let constants =
            Constants::from_elements(elements).map_err(|e| PredictError::InvalidTle {
                source_name: elements
                    .object_name
                    .clone()
                    .unwrap_or_else(|| format!("NORAD {}", elements.norad_id)),
                message: e.to_string(),
            })?;
        Ok(Self {
            station,
            elements,
            constants,
        })
    }

    pub fn satellite_ecef_km(&self, instant: DateTime<Utc>) -> Result<[f64; 3], PredictError> {
        let unavailable = |reason: String| PredictError::GeometryUnavailable { instant, reason };

        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&instant.naive_utc())
            .map_err(|e| unavailable(e.to_string()))?;
        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| unavailable(e.to_string()))?;

        let sidereal =
            sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&instant.naive_utc()));

        Ok(teme_to_ecef_position(prediction.position, sidereal))
    }

    pub fn look_angles(&self, instant: DateTime<Utc>) -> Result<LookAngles, PredictError> {
        let sat_ecef = self.satellite_ecef_km(instant)?;
        let sta_ecef = self.station.position_ecef_km();

        let dr = [
            sat_ecef[0] - sta_ecef[0],
            sat_ecef[1] - sta_ecef[1],
            sat_ecef[2] - sta_ecef[2],
        ];
        let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

        let (east, north, up) = ecef_to_enu(dr, self.station.lat_rad(), self.station.lon_rad());
        let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);
        let elevation_deg = elevation_deg(up, range_km);

        Ok(LookAngles {
            azimuth_deg,
            elevation_deg,
            range_km,
        })
    }
}

impl ElevationSource for Sgp4Geometry<'_> {
    fn elevation_at(&self, instant: DateTime<Utc>) -> Result<f64, PredictError> {
        Ok(self.look_angles(instant)?.elevation_deg)
    }
}

/// Elevation of a vector with local up component `up` and length `range_km`.
///
/// Rounding can leave `up` a hair longer than `range_km`; the ratio is
/// clamped so the result stays within [-90, 90].
pub fn elevation_deg(up: f64, range_km: f64) -> f64 {
    if range_km > 0.0 {
        (up / range_km).clamp(-1.0, 1.0).asin().to_degrees()
    } else {
        0.0
    }
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}
