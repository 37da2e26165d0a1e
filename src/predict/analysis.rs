use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::predict::daily::aggregate_daily;
use crate::predict::error::PredictError;
use crate::predict::geometry::ElevationSource;
use crate::predict::kpi::LinkModel;
use crate::predict::pass_finder::{find_passes, PassParams};
use crate::predict::sampler::Sampler;
use crate::predict::types::{DailySummary, Pass};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub passes: Vec<Pass>,
    pub daily: Vec<DailySummary>,
}

/// Sample, detect, estimate and aggregate one satellite/station pair.
///
/// Configuration is checked before the first elevation is requested. Any
/// error discards everything computed so far.
pub fn analyze<S: ElevationSource + ?Sized>(
    source: &S,
    window: &AnalysisWindow,
    params: PassParams,
    link: &LinkModel,
    day_offset: FixedOffset,
) -> Result<Analysis, PredictError> {
    params.validate()?;
    let sampler = Sampler::new(source, window.start, window.end, window.step)?;

    let passes: Vec<Pass> = find_passes(sampler.samples(), params)?
        .into_iter()
        .map(|w| link.estimate(w))
        .collect();
    let daily = aggregate_daily(&passes, day_offset);

    Ok(Analysis { passes, daily })
}
