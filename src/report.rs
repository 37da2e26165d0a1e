use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::predict::{aggregate_daily, Analysis, DailySummary, LinkModel, Pass};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Results of one satellite/station pair.
pub struct PairResult {
    pub satellite: String,
    pub station: String,
    pub mask_deg: f64,
    /// Offset the pair's daily buckets were cut with.
    pub day_offset: FixedOffset,
    pub analysis: Analysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassRow {
    pub satellite: String,
    pub station: String,
    pub mask_deg: f64,
    pub aos_utc: String,
    pub los_utc: String,
    pub duration_s: f64,
    pub max_elev_deg: f64,
    pub downlink_mbps: f64,
    pub efficiency: f64,
    pub data_mb_est: f64,
    pub date: NaiveDate,
    pub truncated: bool,
    #[serde(skip)]
    aos: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub satellite: String,
    pub station: String,
    pub total_contact_s: f64,
    pub total_data_mb: f64,
    pub max_elev_deg: f64,
    pub passes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotalRow {
    pub date_utc: NaiveDate,
    pub total_contact_s: f64,
    pub total_data_mb: f64,
    pub max_elev_deg: f64,
    pub passes: usize,
}

/// Flattens pair results into tabular rows.
pub struct Report {
    passes: Vec<PassRow>,
    daily: Vec<DailyRow>,
    totals: Vec<DailyTotalRow>,
}

impl Report {
    pub fn new(link: &LinkModel, results: &[PairResult]) -> Self {
        let mut passes: Vec<PassRow> = results
            .iter()
            .flat_map(|r| {
                r.analysis.passes.iter().map(move |p| PassRow {
                    satellite: r.satellite.clone(),
                    station: r.station.clone(),
                    mask_deg: r.mask_deg,
                    aos_utc: iso(p.window.aos),
                    los_utc: iso(p.window.los),
                    duration_s: round_to(p.duration_s(), 1),
                    max_elev_deg: round_to(p.window.max_elevation_deg, 2),
                    downlink_mbps: link.downlink_mbps,
                    efficiency: link.efficiency,
                    data_mb_est: round_to(p.estimated_data_mb(), 2),
                    date: p.aos().with_timezone(&r.day_offset).date_naive(),
                    truncated: p.window.is_truncated(),
                    aos: p.window.aos,
                })
            })
            .collect();
        passes.sort_by_key(|row| row.aos);

        let mut daily: Vec<DailyRow> = results
            .iter()
            .flat_map(|r| {
                r.analysis.daily.iter().map(move |d| DailyRow {
                    date: d.date,
                    satellite: r.satellite.clone(),
                    station: r.station.clone(),
                    total_contact_s: round_to(d.total_contact_s, 1),
                    total_data_mb: round_to(d.total_data_mbit / 8.0, 2),
                    max_elev_deg: round_to(d.max_elevation_deg, 2),
                    passes: d.pass_count,
                })
            })
            .collect();
        daily.sort_by_key(|row| row.date);

        // Stations may bucket in their own offsets, so totals are re-cut in UTC.
        let all_passes: Vec<Pass> = results
            .iter()
            .flat_map(|r| r.analysis.passes.iter().cloned())
            .collect();
        let totals = aggregate_daily(&all_passes, Utc.fix())
            .iter()
            .map(total_row)
            .collect();

        Self {
            passes,
            daily,
            totals,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn passes(&self) -> &[PassRow] {
        &self.passes
    }

    #[cfg(test)]
    pub fn daily(&self) -> &[DailyRow] {
        &self.daily
    }

    #[cfg(test)]
    pub fn totals(&self) -> &[DailyTotalRow] {
        &self.totals
    }

    /// Write `passes.csv`, `daily_summary.csv` and `daily_total.csv` into `outdir`.
    pub fn write_csv(&self, outdir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(outdir)?;

        let passes_path = outdir.join("passes.csv");
        let daily_path = outdir.join("daily_summary.csv");
        let totals_path = outdir.join("daily_total.csv");

        write_rows(fs::File::create(&passes_path)?, &self.passes)?;
        write_rows(fs::File::create(&daily_path)?, &self.daily)?;
        write_rows(fs::File::create(&totals_path)?, &self.totals)?;

        Ok(vec![passes_path, daily_path, totals_path])
    }
}

pub fn write_rows<W: io::Write, R: Serialize>(writer: W, rows: &[R]) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn total_row(day: &DailySummary) -> DailyTotalRow {
    DailyTotalRow {
        date_utc: day.date,
        total_contact_s: round_to(day.total_contact_s, 1),
        total_data_mb: round_to(day.total_data_mbit / 8.0, 2),
        max_elev_deg: round_to(day.max_elevation_deg, 2),
        passes: day.pass_count,
    }
}

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::ContactWindow;
    use chrono::{Duration, TimeZone};

    const LINK: LinkModel = LinkModel {
        downlink_mbps: 50.0,
        efficiency: 0.7,
    };

    fn pass(aos: DateTime<Utc>, duration_s: i64, max_elevation_deg: f64) -> Pass {
        LINK.estimate(ContactWindow {
            aos,
            los: aos + Duration::seconds(duration_s),
            tca: aos,
            max_elevation_deg,
            duration_s: duration_s as f64,
            aos_truncated: false,
            los_truncated: false,
        })
    }

    fn pair(satellite: &str, station: &str, passes: Vec<Pass>) -> PairResult {
        pair_at(satellite, station, passes, Utc.fix())
    }

    fn pair_at(
        satellite: &str,
        station: &str,
        passes: Vec<Pass>,
        day_offset: FixedOffset,
    ) -> PairResult {
        let daily = aggregate_daily(&passes, day_offset);
        PairResult {
            satellite: satellite.to_string(),
            station: station.to_string(),
            mask_deg: 10.0,
            day_offset,
            analysis: Analysis { passes, daily },
        }
    }

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_rows_are_time_ordered() {
        let results = vec![
            pair("SAT-A", "GS1", vec![pass(utc(1, 10), 400, 45.123)]),
            pair("SAT-B", "GS1", vec![pass(utc(1, 2), 300, 20.0), pass(utc(2, 1), 200, 12.0)]),
        ];
        let report = Report::new(&LINK, &results);

        let order: Vec<_> = report.passes().iter().map(|r| r.satellite.as_str()).collect();
        assert_eq!(order, vec!["SAT-B", "SAT-A", "SAT-B"]);

        let first = &report.passes()[1];
        assert_eq!(first.aos_utc, "2026-01-01T10:00:00.000Z");
        assert_eq!(first.max_elev_deg, 45.12);
        // 400 s at 50 Mbit/s and 70% is 14000 Mbit, 1750 MB
        assert_eq!(first.data_mb_est, 1750.0);

        assert_eq!(report.daily().len(), 3);
        assert_eq!(report.totals().len(), 2);
        assert_eq!(report.totals()[0].passes, 2);
        assert_eq!(report.totals()[0].total_contact_s, 700.0);
    }

    #[test]
    fn test_csv_layout() {
        let results = vec![pair("SAT-A", "GS1", vec![pass(utc(1, 10), 400, 45.0)])];
        let report = Report::new(&LINK, &results);

        let mut buf = Vec::new();
        write_rows(&mut buf, report.passes()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "satellite,station,mask_deg,aos_utc,los_utc,duration_s,max_elev_deg,\
             downlink_mbps,efficiency,data_mb_est,date,truncated"
        );
        assert_eq!(
            lines.next().unwrap(),
            "SAT-A,GS1,10.0,2026-01-01T10:00:00.000Z,2026-01-01T10:06:40.000Z,\
             400.0,45.0,50.0,0.7,1750.0,2026-01-01,false"
        );

        let mut buf = Vec::new();
        write_rows(&mut buf, report.daily()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(
            "date,satellite,station,total_contact_s,total_data_mb,max_elev_deg,passes\n\
             2026-01-01,SAT-A,GS1,400.0,1750.0,45.0,1\n"
        ));
    }

    #[test]
    fn test_station_local_dates_and_utc_totals() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let hawaii = FixedOffset::west_opt(10 * 3600).unwrap();
        // 20:00 UTC on the 1st: the 2nd in Tokyo. 06:00 UTC on the 2nd: the 1st in Hawaii.
        let results = vec![
            pair_at("SAT-A", "TOKYO", vec![pass(utc(1, 20), 300, 30.0)], tokyo),
            pair_at("SAT-A", "HAWAII", vec![pass(utc(2, 6), 200, 60.0)], hawaii),
        ];
        let report = Report::new(&LINK, &results);

        let dates: Vec<_> = report.passes().iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-01-02", "2026-01-01"]);

        let local: Vec<_> = report.daily().iter().map(|r| r.date.to_string()).collect();
        assert_eq!(local, vec!["2026-01-01", "2026-01-02"]);

        let totals = report.totals();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].date_utc.to_string(), "2026-01-01");
        assert_eq!(totals[0].total_contact_s, 300.0);
        assert_eq!(totals[1].date_utc.to_string(), "2026-01-02");
        assert_eq!(totals[1].max_elev_deg, 60.0);

        let mut buf = Vec::new();
        write_rows(&mut buf, totals).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("date_utc,total_contact_s,total_data_mb,max_elev_deg,passes\n"));
    }

    #[test]
    fn test_empty_report() {
        let results = vec![pair("SAT-A", "GS1", Vec::new())];
        let report = Report::new(&LINK, &results);
        assert!(report.is_empty());
        assert!(report.totals().is_empty());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(399.96, 1), 400.0);
        assert_eq!(round_to(12.345678, 2), 12.35);
    }
}
