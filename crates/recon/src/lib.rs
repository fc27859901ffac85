//! `tapfare-recon`: tap reconciliation and fare resolution engine.
//!
//! Pure engine crate: receives a loaded fare graph and validated tap events,
//! returns priced trips. No CLI or IO dependencies.

pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod reconcile;
pub mod summary;

pub use config::{ReconConfig, TimestampPolicy};
pub use error::ReconError;
pub use graph::FareGraph;
pub use model::{Diagnostic, ReconOutput, TapEvent, TapType, TripRecord, TripStatus, TripSummary};
pub use reconcile::TripReconciler;

/// Reconcile `events` against `graph` under `config`.
pub fn run(
    config: &ReconConfig,
    graph: &FareGraph,
    events: &[TapEvent],
) -> Result<ReconOutput, ReconError> {
    TripReconciler::with_config(graph, config.clone()).process_events(events)
}
