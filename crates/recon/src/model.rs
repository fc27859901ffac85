use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TapType {
    On,
    Off,
}

impl TapType {
    /// Parse the gate export spelling. Exact match only: `ON` or `OFF`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ON" => Some(Self::On),
            "OFF" => Some(Self::Off),
            _ => None,
        }
    }
}

impl std::fmt::Display for TapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => write!(f, "ON"),
            Self::Off => write!(f, "OFF"),
        }
    }
}

/// A single validated fare-gate tap.
///
/// `id` is carried for diagnostics only. Ordering is always the position of
/// the event in the input, never `id` or `tapped_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapEvent {
    pub id: i64,
    pub tapped_at: DateTime<Utc>,
    pub tap_type: TapType,
    pub stop_id: String,
    pub company_id: String,
    pub bus_id: String,
    pub pan: String,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TripStatus {
    Completed,
    Cancelled,
    Incomplete,
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "COMPLETED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Incomplete => write!(f, "INCOMPLETE"),
        }
    }
}

/// One priced journey. `finished`, `duration_secs` and `to_stop_id` are set
/// for completed and cancelled trips only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripRecord {
    pub started: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub from_stop_id: String,
    pub to_stop_id: Option<String>,
    pub charge_cents: i64,
    pub company_id: String,
    pub bus_id: String,
    pub pan: String,
    pub status: TripStatus,
}

/// Recoverable anomaly seen during a pass. The offending tap is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    OrphanTapOff {
        tap_id: i64,
        pan: String,
        stop_id: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrphanTapOff { tap_id, pan, stop_id } => write!(
                f,
                "skipping tap {tap_id}: card '{pan}' tapped off at '{stop_id}' without a tap-on"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TripSummary {
    pub total_trips: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub incomplete: usize,
    pub total_charged_cents: i64,
    pub orphan_tap_offs: usize,
    /// Charge totals keyed by company.
    pub charged_by_company: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconOutput {
    pub trips: Vec<TripRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: TripSummary,
}
