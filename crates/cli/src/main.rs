// tapfare CLI - reconcile fare-gate taps into priced trips

mod exit_codes;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tapfare_config::Settings;

use exit_codes::{EXIT_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tapfare")]
#[command(about = "Reconcile fare-gate taps into priced trips")]
#[command(version, long_version = long_version())]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (default: ~/.config/tapfare/settings.toml, if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile taps against a fare table and write the trips CSV
    #[command(after_help = "\
Examples:
  tapfare run trip-cost.csv taps.csv trips.csv
  tapfare run trip-cost.csv taps.csv trips.csv --json
  tapfare run trip-cost.csv taps.csv trips.csv --summary summary.json
  tapfare run trip-cost.csv taps.csv trips.csv --config settings.toml")]
    Run {
        /// Fare table CSV (FromStopId,ToStopId,Cost)
        fares: PathBuf,

        /// Tap events CSV (ID,DateTimeUTC,TapType,StopId,CompanyId,BusID,PAN)
        taps: PathBuf,

        /// Trips CSV to write
        output: PathBuf,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the run summary as JSON to a file
        #[arg(long, value_name = "FILE")]
        summary: Option<PathBuf>,
    },

    /// Validate a fare table (and optionally a taps file) without writing output
    #[command(after_help = "\
Examples:
  tapfare check trip-cost.csv
  tapfare check trip-cost.csv taps.csv")]
    Check {
        /// Fare table CSV
        fares: PathBuf,

        /// Tap events CSV to reconcile as a dry run
        taps: Option<PathBuf>,
    },
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("TAPFARE_COMMIT"), ")",
        "\ntarget:  ", env!("TAPFARE_TARGET"),
        "\ndates:   ", "dd-MM-yyyy HH:mm:ss UTC",
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too, on stdout
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    init_logging(cli.verbose);

    let result = Settings::load(cli.config.as_deref())
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))
        .and_then(|settings| match cli.command {
            Commands::Run { fares, taps, output, json, summary } => {
                run::cmd_run(fares, taps, output, json, summary, &settings)
            }
            Commands::Check { fares, taps } => run::cmd_check(fares, taps, &settings),
        });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}
