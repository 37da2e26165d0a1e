mod config;
mod predict;
mod report;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{Config, StationConfig};
use crate::predict::{analyze, PredictError, Sgp4Geometry, TleEntry};
use crate::report::{PairResult, Report};

#[derive(Parser)]
#[command(name = "pass-kpi")]
#[command(about = "Satellite contact windows and data-return estimates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file and its TLEs
    Validate {
        #[arg(short, long, default_value = "config.yml")]
        config: PathBuf,
    },
    /// Predict passes and write CSV reports
    Run {
        #[arg(short, long, default_value = "config.yml")]
        config: PathBuf,
        /// Output directory
        #[arg(default_value = "outputs")]
        outdir: PathBuf,
        /// Also print the pass list as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Run {
            config,
            outdir,
            json,
        } => run(&config, &outdir, json),
    }
}

fn load_config(path: &Path) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => {
            log::info!("Loaded configuration from {}", path.display());
            Some(config)
        }
        Err(e) => {
            eprintln!("Error loading {}: {}", path.display(), e);
            None
        }
    }
}

fn validate(path: &Path) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    println!(
        "Configuration is valid: {} -> {} every {} ({} day boundary)",
        config.time.start_utc,
        config.time.end_utc,
        config.analysis.sample_step_label(),
        config.analysis.day_boundary
    );

    let mut ok = true;
    for satellite in &config.satellites {
        match satellite.load() {
            Ok(entry) => println!(
                "  satellite {} (NORAD {}, from {})",
                entry.info.name, entry.info.norad_id, entry.info.tle_source
            ),
            Err(e) => {
                eprintln!("  satellite {}: {}", satellite.name, e);
                ok = false;
            }
        }
    }
    for station in &config.ground_stations {
        match config.ground_station(station) {
            Ok(gs) => println!(
                "  station {} ({:.4}, {:.4}, {:.0} m) mask {:.1}°",
                gs.name, gs.latitude_deg, gs.longitude_deg, gs.altitude_m, gs.mask_deg
            ),
            Err(e) => {
                eprintln!("  station {}: {}", station.name, e);
                ok = false;
            }
        }
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(path: &Path, outdir: &Path, json: bool) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let window = config.analysis_window();
    let mut results = Vec::new();
    let mut failed = false;

    for satellite in &config.satellites {
        let entry = match satellite.load() {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("Skipping satellite {}: {}", satellite.name, e);
                failed = true;
                continue;
            }
        };

        for station in &config.ground_stations {
            match analyze_pair(&config, &entry, station) {
                Ok(result) => {
                    log::info!(
                        "{} over {}: {} passes on {} days",
                        result.satellite,
                        result.station,
                        result.analysis.passes.len(),
                        result.analysis.daily.len()
                    );
                    results.push(result);
                }
                Err(e) => {
                    log::error!("{} over {} failed: {}", entry.info.name, station.name, e);
                    failed = true;
                }
            }
        }
    }

    log::debug!(
        "Analysed {} -> {} with {} steps",
        window.start,
        window.end,
        config.analysis.sample_step_label()
    );

    let report = Report::new(&config.link, &results);
    if report.is_empty() {
        println!(
            "No passes found. Try: lower mask_deg (e.g., 5.0 or 0.0) or extend the time window."
        );
        return if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if json {
        match serde_json::to_string_pretty(report.passes()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing passes: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    match report.write_csv(outdir) {
        Ok(paths) => {
            println!("Saved:");
            for path in paths {
                println!("- {}", path.display());
            }
        }
        Err(e) => {
            eprintln!("Error writing reports to {}: {}", outdir.display(), e);
            return ExitCode::FAILURE;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn analyze_pair(
    config: &Config,
    entry: &TleEntry,
    station: &StationConfig,
) -> Result<PairResult, PredictError> {
    let ground_station = config.ground_station(station)?;
    let params = config.pass_params(&ground_station);
    let day_offset = config.analysis.day_boundary.offset_for(&ground_station);
    let geometry = Sgp4Geometry::new(ground_station, &entry.elements)?;

    let analysis = analyze(
        &geometry,
        &config.analysis_window(),
        params,
        &config.link,
        day_offset,
    )?;
    Ok(PairResult {
        satellite: entry.info.name.clone(),
        station: station.name.clone(),
        mask_deg: params.mask_deg,
        day_offset,
        analysis,
    })
}
