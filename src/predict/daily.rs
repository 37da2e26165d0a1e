use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::Deserialize;
use strum_macros::Display;

use crate::predict::types::{DailySummary, Pass};
use crate::predict::GroundStation;

/// Which calendar a pass's AOS is read in when bucketing by day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DayBoundary {
    #[default]
    Utc,
    StationLocal,
}

impl DayBoundary {
    pub fn offset_for(&self, station: &GroundStation) -> FixedOffset {
        match self {
            DayBoundary::Utc => Utc.fix(),
            DayBoundary::StationLocal => station.utc_offset,
        }
    }
}

/// Sum passes into one summary per calendar day of AOS.
///
/// A pass belongs to the day its AOS falls on, however much of it runs past
/// midnight. Days without passes are not emitted. Output is sorted by date.
pub fn aggregate_daily(passes: &[Pass], offset: FixedOffset) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();

    for pass in passes {
        let date = pass.aos().with_timezone(&offset).date_naive();
        let day = days.entry(date).or_insert_with(|| empty_day(date));
        day.pass_count += 1;
        day.total_contact_s += pass.duration_s();
        day.total_data_mbit += pass.estimated_data_mbit;
        day.max_elevation_deg = day.max_elevation_deg.max(pass.window.max_elevation_deg);
    }

    days.into_values().collect()
}

fn empty_day(date: NaiveDate) -> DailySummary {
    DailySummary {
        date,
        pass_count: 0,
        total_contact_s: 0.0,
        total_data_mbit: 0.0,
        max_elevation_deg: f64::NEG_INFINITY,
    }
}
