use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::types::{ContactWindow, Sample};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassParams {
    pub mask_deg: f64,
    pub min_pass_duration_s: f64,
}

impl PassParams {
    pub fn validate(&self) -> Result<(), PredictError> {
        if !(-90.0..=90.0).contains(&self.mask_deg) {
            return Err(PredictError::invalid(
                "mask_deg",
                format!("{} is outside [-90, 90]", self.mask_deg),
            ));
        }
        if self.min_pass_duration_s.is_nan() || self.min_pass_duration_s < 0.0 {
            return Err(PredictError::invalid(
                "min_pass_duration_s",
                format!("must be non-negative, got {}", self.min_pass_duration_s),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum DetectorState {
    BelowMask {
        prev: Option<Sample>,
    },
    InPass {
        aos: DateTime<Utc>,
        aos_truncated: bool,
        tca: DateTime<Utc>,
        max_elevation_deg: f64,
        prev: Sample,
    },
}

/// Turns an ordered elevation series into contact windows.
///
/// Samples are fed one at a time with [`PassDetector::push`]; only the
/// previous sample and the open window are kept, so memory does not grow
/// with the length of the interval. AOS and LOS are placed where the straight
/// line between the two samples bracketing the crossing meets the mask.
///
/// A window still open when the series ends is closed at the last sample and
/// emitted with `los_truncated` set. A window that is already open at the
/// first sample is emitted with `aos_truncated` set. Windows shorter than the
/// minimum duration, or of zero length, are dropped.
#[derive(Debug, Clone)]
pub struct PassDetector {
    params: PassParams,
    state: DetectorState,
}

impl PassDetector {
    pub fn new(params: PassParams) -> Result<Self, PredictError> {
        params.validate()?;
        Ok(Self {
            params,
            state: DetectorState::BelowMask { prev: None },
        })
    }

    #[cfg(test)]
    pub fn is_in_pass(&self) -> bool {
        matches!(self.state, DetectorState::InPass { .. })
    }

    pub fn push(&mut self, sample: Sample) -> Option<ContactWindow> {
        let mask = self.params.mask_deg;
        let above = sample.elevation_deg >= mask;
        let state = std::mem::replace(&mut self.state, DetectorState::BelowMask { prev: None });

        match state {
            DetectorState::BelowMask { prev } => {
                if above {
                    let (aos, aos_truncated) = match prev {
                        Some(prev) => (interpolate_crossing(&prev, &sample, mask), false),
                        None => (sample.timestamp, true),
                    };
                    self.state = DetectorState::InPass {
                        aos,
                        aos_truncated,
                        tca: sample.timestamp,
                        max_elevation_deg: sample.elevation_deg,
                        prev: sample,
                    };
                } else {
                    self.state = DetectorState::BelowMask { prev: Some(sample) };
                }
                None
            }
            DetectorState::InPass {
                aos,
                aos_truncated,
                mut tca,
                mut max_elevation_deg,
                prev,
            } => {
                debug_assert!(sample.timestamp > prev.timestamp);
                if above {
                    if sample.elevation_deg > max_elevation_deg {
                        max_elevation_deg = sample.elevation_deg;
                        tca = sample.timestamp;
                    }
                    self.state = DetectorState::InPass {
                        aos,
                        aos_truncated,
                        tca,
                        max_elevation_deg,
                        prev: sample,
                    };
                    None
                } else {
                    let los = interpolate_crossing(&prev, &sample, mask);
                    self.state = DetectorState::BelowMask { prev: Some(sample) };
                    self.close(aos, los, tca, max_elevation_deg, aos_truncated, false)
                }
            }
        }
    }

    /// Ends the series, closing a pass that is still open at the last sample.
    pub fn finish(mut self) -> Option<ContactWindow> {
        let state = std::mem::replace(&mut self.state, DetectorState::BelowMask { prev: None });
        match state {
            DetectorState::InPass {
                aos,
                aos_truncated,
                tca,
                max_elevation_deg,
                prev,
            } => self.close(aos, prev.timestamp, tca, max_elevation_deg, aos_truncated, true),
            DetectorState::BelowMask { .. } => None,
        }
    }

    fn close(
        &self,
        aos: DateTime<Utc>,
        los: DateTime<Utc>,
        tca: DateTime<Utc>,
        max_elevation_deg: f64,
        aos_truncated: bool,
        los_truncated: bool,
    ) -> Option<ContactWindow> {
        let duration_s = seconds_between(aos, los);
        if duration_s <= 0.0 || duration_s < self.params.min_pass_duration_s {
            log::debug!(
                "Dropping {:.1}s window at {} (minimum {:.1}s)",
                duration_s,
                aos,
                self.params.min_pass_duration_s
            );
            return None;
        }

        Some(ContactWindow {
            aos,
            los,
            tca,
            max_elevation_deg,
            duration_s,
            aos_truncated,
            los_truncated,
        })
    }
}

/// Run the detector over a whole sample series.
///
/// The first sample error aborts the scan; windows found before it are
/// discarded along with the rest.
pub fn find_passes<I>(samples: I, params: PassParams) -> Result<Vec<ContactWindow>, PredictError>
where
    I: IntoIterator<Item = Result<Sample, PredictError>>,
{
    let mut detector = PassDetector::new(params)?;
    let mut windows = Vec::new();

    for sample in samples {
        if let Some(window) = detector.push(sample?) {
            log::debug!(
                "Window {} -> {} ({:.1}s, max {:.2}°)",
                window.aos,
                window.los,
                window.duration_s,
                window.max_elevation_deg
            );
            windows.push(window);
        }
    }
    windows.extend(detector.finish());

    Ok(windows)
}

/// Instant where the segment between two samples meets `mask_deg`.
fn interpolate_crossing(prev: &Sample, curr: &Sample, mask_deg: f64) -> DateTime<Utc> {
    let delta = curr.elevation_deg - prev.elevation_deg;
    if delta == 0.0 {
        return curr.timestamp;
    }
    let fraction = ((mask_deg - prev.elevation_deg) / delta).clamp(0.0, 1.0);
    let span_us = (curr.timestamp - prev.timestamp)
        .num_microseconds()
        .unwrap_or(i64::MAX);
    prev.timestamp + Duration::microseconds((span_us as f64 * fraction).round() as i64)
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end - start;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
