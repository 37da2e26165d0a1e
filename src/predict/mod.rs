mod analysis;
mod daily;
mod error;
mod geometry;
mod ground_station;
mod kpi;
mod pass_finder;
mod sampler;
#[cfg(test)]
mod testing;
mod tle_loader;
mod types;

pub use analysis::{analyze, Analysis, AnalysisWindow};
pub use daily::{aggregate_daily, DayBoundary};
pub use error::PredictError;
pub use geometry::Sgp4Geometry;
pub use ground_station::GroundStation;
pub use kpi::LinkModel;
pub use pass_finder::PassParams;
pub use tle_loader::{parse_inline, TleEntry, TleLoader};
pub use types::{DailySummary, Pass};

#[cfg(test)]
pub use types::ContactWindow;
