use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use conj_o_mat::config::{parse_duration, Config, ScreeningConfig};
use conj_o_mat::predict::{ground_track, GroundTrackPoint, TleLoader};
use conj_o_mat::screening::{
    scan, scan_all_pairs, score, screen, screen_all_pairs, ConjunctionRecord, RiskRecord,
    ScreeningReport,
};

#[derive(Parser)]
#[command(name = "conj-o-mat")]
#[command(about = "Satellite conjunction screening and collision risk scoring")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,
    /// TLE file or folder, overriding the configured catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct WindowArgs {
    /// Window length, e.g. 24h
    #[arg(long, value_parser = parse_duration)]
    duration: Option<chrono::Duration>,
    /// Sample step, e.g. 10m
    #[arg(long, value_parser = parse_duration)]
    step: Option<chrono::Duration>,
    /// Conjunction threshold in km
    #[arg(long)]
    threshold_km: Option<f64>,
    /// Window start (RFC3339); defaults to the current minute
    #[arg(long)]
    start: Option<DateTime<Utc>>,
    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

impl WindowArgs {
    fn apply(&self, defaults: &ScreeningConfig) -> ScreeningConfig {
        let mut window = defaults.clone();
        if let Some(duration) = self.duration {
            window.duration = duration;
        }
        if let Some(step) = self.step {
            window.step = step;
        }
        if let Some(threshold_km) = self.threshold_km {
            window.threshold_km = threshold_km;
        }
        if self.start.is_some() {
            window.start = self.start;
        }
        window
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the loaded catalog
    Catalog,
    /// Screen a reference satellite: conjunction timeline plus risk table
    Screen {
        reference: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Screen every pair in the catalog
    ScreenAll {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Conjunction timeline only, for one reference or every pair
    Scan {
        /// Reference satellite; omit with --all
        reference: Option<String>,
        #[arg(long, conflicts_with = "reference")]
        all: bool,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Risk score of the reference against every other satellite
    Risk {
        reference: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Ground track of one satellite
    Track {
        satellite: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Serve the HTTP API
    Serve,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Commands::Serve = cli.command {
        return serve(config);
    }

    let mut loader = TleLoader::new(config.catalog.tle_source.clone());
    if let Err(e) = loader.load_all() {
        eprintln!("Catalog error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli.command, &config, &loader) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match (&cli.config, &cli.catalog) {
        (Some(path), _) => Config::from_file(path).map_err(|e| e.to_string())?,
        (None, Some(catalog)) => Config::for_catalog(catalog.clone()),
        (None, None) => return Err("either --config or --catalog is required".into()),
    };
    if let Some(catalog) = &cli.catalog {
        config.catalog.tle_source = catalog.clone();
    }
    Ok(config)
}

fn run(
    command: &Commands,
    config: &Config,
    loader: &TleLoader,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = loader.satellites();

    match command {
        Commands::Catalog => {
            for sat in catalog {
                println!("{:>6}  {}  ({})", sat.info.norad_id, sat.info.name, sat.info.tle_source);
            }
            println!("{} satellites", catalog.len());
        }
        Commands::Screen { reference, window } => {
            let settings = window.apply(&config.screening);
            let grid = settings.grid(Utc::now())?;
            let report = screen(reference, catalog, &grid, settings.threshold_km)?;
            if window.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::ScreenAll { window } => {
            let settings = window.apply(&config.screening);
            let grid = settings.grid(Utc::now())?;
            let report = screen_all_pairs(catalog, &grid, settings.threshold_km)?;
            if window.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Scan {
            reference,
            all,
            window,
        } => {
            let settings = window.apply(&config.screening);
            let grid = settings.grid(Utc::now())?;
            let records = match (reference, all) {
                (Some(reference), false) => {
                    scan(reference, catalog, &grid, settings.threshold_km)?
                }
                (None, true) => scan_all_pairs(catalog, &grid, settings.threshold_km)?,
                _ => return Err("give a reference satellite or --all".into()),
            };
            if window.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_conjunctions(&records);
            }
        }
        Commands::Risk { reference, window } => {
            let settings = window.apply(&config.screening);
            let grid = settings.grid(Utc::now())?;
            let records = score(reference, catalog, &grid)?;
            if window.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_risks(&records);
            }
        }
        Commands::Track { satellite, window } => {
            let settings = window.apply(&config.screening);
            let grid = settings.grid(Utc::now())?;
            let entry = loader
                .get(satellite)
                .ok_or_else(|| format!("unknown satellite: {}", satellite))?;
            let track = ground_track(entry, &grid)?;
            if window.json {
                println!("{}", serde_json::to_string_pretty(&track)?);
            } else {
                print_track(&track);
            }
        }
        Commands::Serve => return Err("serve does not run against a preloaded catalog".into()),
    }

    Ok(())
}

fn serve(config: Config) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(conj_o_mat::web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &ScreeningReport) {
    println!(
        "Window {} .. {} ({} samples), threshold {} km",
        report.grid_start, report.grid_end, report.samples, report.threshold_km
    );
    println!();
    if report.conjunctions.is_empty() {
        println!("No conjunctions detected.");
        return;
    }
    print_conjunctions(&report.conjunctions);
    println!();
    print_risks(&report.risks);
    println!();
    println!(
        "Total conjunctions: {}  High-risk encounters: {}  Highest risk score: {}",
        report.summary.total_conjunctions,
        report.summary.high_risk_count,
        report
            .summary
            .max_risk_score
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "-".into())
    );
}

fn print_conjunctions(records: &[ConjunctionRecord]) {
    println!(
        "{:<20}  {:<24}  {:<24}  {:>12}  {:>10}",
        "Time (UTC)", "Satellite 1", "Satellite 2", "Distance km", "Rel km/s"
    );
    for r in records {
        println!(
            "{:<20}  {:<24}  {:<24}  {:>12.3}  {:>10.3}",
            r.time.format("%Y-%m-%d %H:%M:%S"),
            r.satellite_a,
            r.satellite_b,
            r.distance_km,
            r.relative_speed_km_s
        );
    }
}

fn print_risks(records: &[RiskRecord]) {
    println!(
        "{:<24}  {:<24}  {:>12}  {:>10}  {:>6}  {}",
        "Satellite 1", "Satellite 2", "Min dist km", "Rel km/s", "Risk", "Level"
    );
    for r in records {
        println!(
            "{:<24}  {:<24}  {:>12.2}  {:>10.2}  {:>6.3}  {}",
            r.satellite_a,
            r.satellite_b,
            r.min_distance_km,
            r.relative_speed_at_min_km_s,
            r.risk_score,
            r.risk_level
        );
    }
}

fn print_track(track: &[GroundTrackPoint]) {
    println!(
        "{:<20}  {:>9}  {:>10}  {:>9}",
        "Time (UTC)", "Lat deg", "Lon deg", "Alt km"
    );
    for p in track {
        println!(
            "{:<20}  {:>9.2}  {:>10.2}  {:>9.2}",
            p.timestamp.format("%Y-%m-%d %H:%M:%S"),
            p.latitude_deg,
            p.longitude_deg,
            p.altitude_km
        );
    }
}
