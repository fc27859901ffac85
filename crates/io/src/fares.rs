// Fare table CSV: FromStopId,ToStopId,Cost

use std::path::Path;

use tapfare_recon::FareGraph;

use crate::error::IoError;
use crate::format::{parse_cost_cents, read_file_as_utf8};
use crate::{column_index, csv_reader};

pub const COL_FROM: &str = "FromStopId";
pub const COL_TO: &str = "ToStopId";
pub const COL_COST: &str = "Cost";

const FILE: &str = "fare table";

/// Build a fare graph from CSV text and compute its fallback fares.
pub fn load_fare_graph(csv_data: &str) -> Result<FareGraph, IoError> {
    let mut reader = csv_reader(csv_data);
    let headers = reader.headers()?.clone();

    let from_idx = column_index(&headers, COL_FROM, FILE)?;
    let to_idx = column_index(&headers, COL_TO, FILE)?;
    let cost_idx = column_index(&headers, COL_COST, FILE)?;

    let mut graph = FareGraph::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1
        let line = i + 2;

        let from = record.get(from_idx).unwrap_or("");
        let to = record.get(to_idx).unwrap_or("");
        let cost_str = record.get(cost_idx).unwrap_or("");
        let cost_cents = parse_cost_cents(cost_str).ok_or_else(|| IoError::InvalidCost {
            line,
            value: cost_str.into(),
        })?;

        graph
            .add_edge(from, to, cost_cents)
            .map_err(|source| IoError::Route { line, source })?;
    }

    graph
        .compute_fallback_costs()
        .map_err(|source| IoError::Route { line: 0, source })?;

    log::info!(
        "loaded fare table: {} stops, {} fares",
        graph.stop_count(),
        graph.edge_count()
    );
    Ok(graph)
}

pub fn load_fare_graph_file(path: &Path) -> Result<FareGraph, IoError> {
    let csv_data = read_file_as_utf8(path)?;
    load_fare_graph(&csv_data)
}
