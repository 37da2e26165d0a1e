use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::geometry::ElevationSource;
use crate::predict::types::Sample;

/// Fixed-step walk over an analysis interval.
///
/// Each call to [`Sampler::samples`] starts a fresh pass over the interval,
/// so the same sampler can be replayed. Nothing is buffered: every sample is
/// computed when the iterator is advanced.
pub struct Sampler<'a, S: ElevationSource + ?Sized> {
    source: &'a S,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
}

impl<'a, S: ElevationSource + ?Sized> Sampler<'a, S> {
    pub fn new(
        source: &'a S,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<Self, PredictError> {
        if step <= Duration::zero() {
            return Err(PredictError::invalid(
                "sample_step",
                format!("step must be positive, got {}", step),
            ));
        }
        if end <= start {
            return Err(PredictError::invalid(
                "time",
                format!("end {} is not after start {}", end, start),
            ));
        }
        Ok(Self {
            source,
            start,
            end,
            step,
        })
    }

    pub fn samples(&self) -> Samples<'a, S> {
        Samples {
            source: self.source,
            cursor: Some(self.start),
            end: self.end,
            step: self.step,
        }
    }
}

pub struct Samples<'a, S: ElevationSource + ?Sized> {
    source: &'a S,
    cursor: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
    step: Duration,
}

impl<S: ElevationSource + ?Sized> Iterator for Samples<'_, S> {
    type Item = Result<Sample, PredictError>;

    fn next(&mut self) -> Option<Self::Item> {
        let timestamp = self.cursor.filter(|t| *t <= self.end)?;
        self.cursor = timestamp.checked_add_signed(self.step);

        Some(
            self.source
                .elevation_at(timestamp)
                .map(|elevation_deg| Sample {
                    timestamp,
                    elevation_deg,
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
    }

    impl ElevationSource for Counting {
        fn elevation_at(&self, instant: DateTime<Utc>) -> Result<f64, PredictError> {
            self.calls.set(self.calls.get() + 1);
            Ok(instant.timestamp() as f64)
        }
    }

    struct Broken;

    impl ElevationSource for Broken {
        fn elevation_at(&self, instant: DateTime<Utc>) -> Result<f64, PredictError> {
            Err(PredictError::GeometryUnavailable {
                instant,
                reason: "elements expired".into(),
            })
        }
    }

    fn t(s: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(s, 0).unwrap()
    }

    #[test]
    fn test_inclusive_end() {
        let source = Counting { calls: Cell::new(0) };
        let sampler = Sampler::new(&source, t(0), t(30), Duration::seconds(10)).unwrap();
        let stamps: Vec<_> = sampler
            .samples()
            .map(|s| s.unwrap().timestamp)
            .collect();
        assert_eq!(stamps, vec![t(0), t(10), t(20), t(30)]);
    }

    #[test]
    fn test_stops_before_overshoot() {
        let source = Counting { calls: Cell::new(0) };
        let sampler = Sampler::new(&source, t(0), t(25), Duration::seconds(10)).unwrap();
        assert_eq!(sampler.samples().count(), 3);
    }

    #[test]
    fn test_lazy_and_restartable() {
        let source = Counting { calls: Cell::new(0) };
        let sampler = Sampler::new(&source, t(0), t(100), Duration::seconds(10)).unwrap();
        assert_eq!(source.calls.get(), 0);

        let first: Vec<_> = sampler.samples().take(2).collect::<Result<_, _>>().unwrap();
        assert_eq!(source.calls.get(), 2);
        assert_eq!(first[1].elevation_deg, 10.0);

        let all: Vec<_> = sampler.samples().collect::<Result<_, _>>().unwrap();
        assert_eq!(all.len(), 11);
        assert_eq!(all[0], first[0]);
    }

    #[test]
    fn test_rejects_bad_step_and_interval() {
        let source = Counting { calls: Cell::new(0) };
        assert!(matches!(
            Sampler::new(&source, t(0), t(10), Duration::zero()),
            Err(PredictError::InvalidConfiguration { parameter: "sample_step", .. })
        ));
        assert!(Sampler::new(&source, t(0), t(10), Duration::seconds(-1)).is_err());
        assert!(matches!(
            Sampler::new(&source, t(10), t(10), Duration::seconds(1)),
            Err(PredictError::InvalidConfiguration { parameter: "time", .. })
        ));
        assert!(Sampler::new(&source, t(10), t(0), Duration::seconds(1)).is_err());
    }

    #[test]
    fn test_geometry_errors_are_yielded() {
        let sampler = Sampler::new(&Broken, t(0), t(10), Duration::seconds(5)).unwrap();
        let first = sampler.samples().next().unwrap();
        assert!(matches!(first, Err(PredictError::GeometryUnavailable { .. })));
    }
}
