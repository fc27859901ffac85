use crate::model::{Diagnostic, TripRecord, TripStatus, TripSummary};

/// Compute summary statistics from priced trips.
pub fn compute_summary(trips: &[TripRecord], diagnostics: &[Diagnostic]) -> TripSummary {
    let mut summary = TripSummary {
        total_trips: trips.len(),
        ..TripSummary::default()
    };

    for trip in trips {
        match trip.status {
            TripStatus::Completed => summary.completed += 1,
            TripStatus::Cancelled => summary.cancelled += 1,
            TripStatus::Incomplete => summary.incomplete += 1,
        }
        summary.total_charged_cents += trip.charge_cents;
        *summary
            .charged_by_company
            .entry(trip.company_id.clone())
            .or_insert(0) += trip.charge_cents;
    }

    summary.orphan_tap_offs = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::OrphanTapOff { .. }))
        .count();

    summary
}
