use std::process::ExitCode;

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use grib_mirror::app::App;
use grib_mirror::config::ConfigLoader;
use grib_mirror::domain::Outlook;
use grib_mirror::error::MirrorError;
use grib_mirror::output::JsonOutput;
use grib_mirror::transport::HttpConnector;

#[derive(Parser)]
#[command(name = "grib-mirror")]
#[command(about = "Mirrors time-partitioned NWP model output into a local on-disk cache")]
#[command(version, author)]
struct Cli {
    /// Path to a JSON dataset config (defaults to grib-mirror.json, or the
    /// built-in GFS/RAP profiles when that file is absent)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch the trailing 24 hours for every valid outlook")]
    Latest(LatestArgs),
    #[command(about = "Fetch a closed time range for one outlook (historical backfill)")]
    Range(RangeArgs),
    #[command(about = "List the resolved dataset profiles")]
    Datasets,
}

#[derive(Args)]
struct LatestArgs {
    /// Dataset name; all configured datasets when omitted
    #[arg(long)]
    dataset: Option<String>,
}

#[derive(Args)]
struct RangeArgs {
    #[arg(long)]
    dataset: String,

    /// Window start, RFC 3339 (e.g. 2012-06-01T00:00:00Z)
    #[arg(long)]
    start: String,

    /// Window end, RFC 3339, inclusive
    #[arg(long)]
    end: String,

    #[arg(long)]
    outlook: Outlook,

    /// Walk step in hours; defaults to the dataset's cycle interval
    #[arg(long)]
    step_hours: Option<u32>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(mirror) = report.downcast_ref::<MirrorError>() {
            return ExitCode::from(map_exit_code(mirror));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MirrorError) -> u8 {
    match error {
        MirrorError::UnknownDataset(_)
        | MirrorError::InvalidOutlook(_)
        | MirrorError::OutlookNotConfigured { .. }
        | MirrorError::InvalidTimestamp(_)
        | MirrorError::InvalidRange(_)
        | MirrorError::ConfigRead(_)
        | MirrorError::ConfigParse(_)
        | MirrorError::InvalidTemplate(_)
        | MirrorError::InvalidProfile { .. } => 2,
        MirrorError::Connect { .. } => 3,
        MirrorError::Filesystem(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolved = ConfigLoader::resolve(cli.config.as_deref()).into_diagnostic()?;

    match cli.command {
        Commands::Latest(args) => {
            let app = App::new(HttpConnector);
            let profiles: Vec<_> = match args.dataset {
                Some(name) => vec![resolved.find(&name).into_diagnostic()?],
                None => resolved.datasets.iter().collect(),
            };

            let mut reports = Vec::new();
            for profile in profiles {
                reports.push(app.fetch_latest(profile).into_diagnostic()?);
            }
            JsonOutput::print_latest(&reports).into_diagnostic()?;
            Ok(())
        }
        Commands::Range(args) => {
            let profile = resolved.find(&args.dataset).into_diagnostic()?;
            if !profile.valid_outlooks.contains(&args.outlook) {
                return Err(MirrorError::OutlookNotConfigured {
                    outlook: args.outlook.hours(),
                    dataset: profile.name.clone(),
                })
                .into_diagnostic();
            }

            let start = parse_timestamp(&args.start).into_diagnostic()?;
            let end = parse_timestamp(&args.end).into_diagnostic()?;
            if start > end {
                return Err(MirrorError::InvalidRange(format!(
                    "start {start} is after end {end}"
                )))
                .into_diagnostic();
            }
            let step = match args.step_hours {
                Some(hours) => Duration::hours(i64::from(hours)),
                None => profile.cycle_interval,
            };

            let app = App::new(HttpConnector);
            let report = app
                .fetch_range(profile, start, end, args.outlook, step)
                .into_diagnostic()?;
            JsonOutput::print_range(&report).into_diagnostic()?;
            Ok(())
        }
        Commands::Datasets => {
            JsonOutput::print_datasets(&resolved.datasets).into_diagnostic()?;
            Ok(())
        }
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, MirrorError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| MirrorError::InvalidTimestamp(value.to_string()))
}
