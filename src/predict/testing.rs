//! Synthetic elevation profiles for exercising the windowing core without SGP4.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::predict::error::PredictError;
use crate::predict::geometry::ElevationSource;

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    epoch() + Duration::seconds(seconds)
}

/// Piecewise-linear elevation through `(seconds since origin, degrees)` knots,
/// flat beyond the first and last knot.
pub struct Profile {
    origin: DateTime<Utc>,
    knots: Vec<(f64, f64)>,
}

impl Profile {
    pub fn new(knots: &[(f64, f64)]) -> Self {
        Self::starting_at(epoch(), knots)
    }

    pub fn starting_at(origin: DateTime<Utc>, knots: &[(f64, f64)]) -> Self {
        Self {
            origin,
            knots: knots.to_vec(),
        }
    }

    pub fn constant(elevation_deg: f64) -> Self {
        Self::new(&[(0.0, elevation_deg)])
    }

    /// 0° → 10° at 100 s → 45° at 300 s → 10° at 500 s → 0° at 600 s.
    pub fn triangle() -> Self {
        Self::new(&[
            (0.0, 0.0),
            (100.0, 10.0),
            (300.0, 45.0),
            (500.0, 10.0),
            (600.0, 0.0),
        ])
    }

    fn value(&self, t: f64) -> f64 {
        let first = self.knots[0];
        if t <= first.0 {
            return first.1;
        }
        for pair in self.knots.windows(2) {
            let (t0, e0) = pair[0];
            let (t1, e1) = pair[1];
            if t <= t1 {
                return e0 + (e1 - e0) * (t - t0) / (t1 - t0);
            }
        }
        self.knots[self.knots.len() - 1].1
    }
}

impl ElevationSource for Profile {
    fn elevation_at(&self, instant: DateTime<Utc>) -> Result<f64, PredictError> {
        let seconds = (instant - self.origin).num_milliseconds() as f64 / 1000.0;
        Ok(self.value(seconds))
    }
}

/// Fails for every instant at or after `from`.
pub struct FailsAfter {
    pub inner: Profile,
    pub from: DateTime<Utc>,
}

impl ElevationSource for FailsAfter {
    fn elevation_at(&self, instant: DateTime<Utc>) -> Result<f64, PredictError> {
        if instant >= self.from {
            return Err(PredictError::GeometryUnavailable {
                instant,
                reason: "propagation out of range".into(),
            });
        }
        self.inner.elevation_at(instant)
    }
}
