//! `tapfare run` / `tapfare check`

use std::path::{Path, PathBuf};

use serde::Serialize;
use tapfare_config::Settings;
use tapfare_io::format::format_cents;
use tapfare_io::{load_fare_graph_file, read_taps_file, write_trips_file};
use tapfare_recon::{Diagnostic, FareGraph, ReconOutput, TapEvent, TripSummary};

use crate::exit_codes::{io_exit_code, recon_exit_code, EXIT_ERROR, EXIT_IO};
use crate::CliError;

/// JSON report for `--json` / `--summary`.
#[derive(Serialize)]
struct RunReport<'a> {
    engine_version: &'static str,
    summary: &'a TripSummary,
    diagnostics: &'a [Diagnostic],
}

pub fn cmd_run(
    fares: PathBuf,
    taps: PathBuf,
    output: PathBuf,
    json: bool,
    summary_file: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), CliError> {
    let graph = load_graph(&fares)?;
    let events = load_taps(&taps)?;
    let result = reconcile(&graph, &events, settings)?;

    write_trips_file(&output, &result.trips, &settings.output)
        .map_err(|e| CliError::new(io_exit_code(&e), e.to_string()))?;
    eprintln!("wrote {}", output.display());

    if json || summary_file.is_some() {
        let report = RunReport {
            engine_version: env!("CARGO_PKG_VERSION"),
            summary: &result.summary,
            diagnostics: &result.diagnostics,
        };
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = summary_file {
            std::fs::write(path, &json_str).map_err(|e| {
                CliError::new(EXIT_IO, format!("cannot write {}: {e}", path.display()))
            })?;
            eprintln!("wrote {}", path.display());
        }
        if json {
            println!("{json_str}");
        }
    }

    print_summary(&result.summary, &settings.output.currency_symbol);
    Ok(())
}

pub fn cmd_check(fares: PathBuf, taps: Option<PathBuf>, settings: &Settings) -> Result<(), CliError> {
    let graph = load_graph(&fares)?;
    let symbol = &settings.output.currency_symbol;

    println!("stops: {}", graph.stop_count());
    println!("fares: {}", graph.edge_count());
    println!("fallback fares:");
    for stop in graph.stops() {
        let cents = graph
            .fallback_cost(stop)
            .map_err(|e| CliError::new(recon_exit_code(&e), e.to_string()))?;
        println!("  {stop}\t{}", format_cents(cents, symbol));
    }

    if let Some(taps) = taps {
        let events = load_taps(&taps)?;
        let result = reconcile(&graph, &events, settings)?;
        print_summary(&result.summary, symbol);
    }
    Ok(())
}

fn load_graph(path: &Path) -> Result<FareGraph, CliError> {
    load_fare_graph_file(path).map_err(|e| {
        CliError::new(io_exit_code(&e), format!("{}: {e}", path.display()))
    })
}

fn load_taps(path: &Path) -> Result<Vec<TapEvent>, CliError> {
    read_taps_file(path).map_err(|e| CliError::new(io_exit_code(&e), format!("{}: {e}", path.display())))
}

fn reconcile(graph: &FareGraph, events: &[TapEvent], settings: &Settings) -> Result<ReconOutput, CliError> {
    tapfare_recon::run(&settings.recon, graph, events).map_err(|e| {
        let hint = match e {
            tapfare_recon::ReconError::OutOfOrderTaps { .. } => Some(
                "set timestamp_policy = \"clamp\" or \"pass_through\" under [recon] in the settings file"
                    .to_string(),
            ),
            tapfare_recon::ReconError::InvalidRoute(_) => {
                Some("every tapped stop pair needs a row in the fare table".to_string())
            }
        };
        CliError {
            code: recon_exit_code(&e),
            message: e.to_string(),
            hint,
        }
    })
}

/// Human summary to stderr
fn print_summary(s: &TripSummary, symbol: &str) {
    eprintln!(
        "{} trips: {} completed, {} cancelled, {} incomplete, {} charged",
        s.total_trips,
        s.completed,
        s.cancelled,
        s.incomplete,
        format_cents(s.total_charged_cents, symbol),
    );
    if s.orphan_tap_offs > 0 {
        eprintln!("skipped {} tap-off(s) without a tap-on", s.orphan_tap_offs);
    }
}
