use std::collections::HashMap;

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::graph::FareGraph;
use crate::model::{Diagnostic, ReconOutput, TapEvent, TapType, TripRecord, TripStatus};
use crate::summary::compute_summary;

/// Pairs tap-ons with tap-offs per card and prices the resulting trips.
pub struct TripReconciler<'a> {
    graph: &'a FareGraph,
    config: ReconConfig,
}

/// The unmatched tap-on for a card, with its position in the input.
struct OpenTrip<'e> {
    position: usize,
    tap_on: &'e TapEvent,
}

impl<'a> TripReconciler<'a> {
    pub fn new(graph: &'a FareGraph) -> Self {
        Self::with_config(graph, ReconConfig::default())
    }

    pub fn with_config(graph: &'a FareGraph, config: ReconConfig) -> Self {
        Self { graph, config }
    }

    /// Single forward pass over `events` in input order.
    ///
    /// Every tap-on yields exactly one trip: paired with the card's next
    /// tap-off, closed as incomplete by the card's next tap-on, or flushed as
    /// incomplete at end of input. Tap-offs with no open tap-on are skipped
    /// and reported as diagnostics. Any fare lookup failure aborts the pass.
    pub fn process_events(&self, events: &[TapEvent]) -> Result<ReconOutput, ReconError> {
        let mut open: HashMap<&str, OpenTrip<'_>> = HashMap::new();
        let mut trips = Vec::new();
        let mut diagnostics = Vec::new();

        for (position, event) in events.iter().enumerate() {
            match event.tap_type {
                TapType::On => {
                    let opened = OpenTrip { position, tap_on: event };
                    if let Some(previous) = open.insert(event.pan.as_str(), opened) {
                        log::debug!(
                            "card '{}' tapped on again at tap {}, closing tap {} as incomplete",
                            event.pan,
                            event.id,
                            previous.tap_on.id
                        );
                        trips.push(self.incomplete_trip(previous.tap_on)?);
                    }
                }
                TapType::Off => match open.remove(event.pan.as_str()) {
                    Some(start) => trips.push(self.paired_trip(start.tap_on, event)?),
                    None => {
                        let diagnostic = Diagnostic::OrphanTapOff {
                            tap_id: event.id,
                            pan: event.pan.clone(),
                            stop_id: event.stop_id.clone(),
                        };
                        log::warn!("{diagnostic}");
                        diagnostics.push(diagnostic);
                    }
                },
            }
        }

        // Flush in the order the still-open tap-ons appeared in the input.
        let mut remaining: Vec<OpenTrip<'_>> = open.into_values().collect();
        remaining.sort_by_key(|t| t.position);
        for start in remaining {
            trips.push(self.incomplete_trip(start.tap_on)?);
        }

        let summary = compute_summary(&trips, &diagnostics);
        log::info!(
            "reconciled {} taps into {} trips ({} completed, {} cancelled, {} incomplete)",
            events.len(),
            summary.total_trips,
            summary.completed,
            summary.cancelled,
            summary.incomplete
        );

        Ok(ReconOutput {
            trips,
            diagnostics,
            summary,
        })
    }

    fn paired_trip(&self, start: &TapEvent, end: &TapEvent) -> Result<TripRecord, ReconError> {
        // Route errors take precedence over tap ordering
        let charge_cents = self.graph.cost(&start.stop_id, Some(&end.stop_id))?;
        let raw_secs = (end.tapped_at - start.tapped_at).num_seconds();
        let duration_secs = self
            .config
            .resolve_duration(raw_secs, start.id, end.id, &start.pan)?;
        let status = if start.stop_id == end.stop_id {
            TripStatus::Cancelled
        } else {
            TripStatus::Completed
        };

        Ok(TripRecord {
            started: start.tapped_at,
            finished: Some(end.tapped_at),
            duration_secs: Some(duration_secs),
            from_stop_id: start.stop_id.clone(),
            to_stop_id: Some(end.stop_id.clone()),
            charge_cents,
            company_id: start.company_id.clone(),
            bus_id: start.bus_id.clone(),
            pan: start.pan.clone(),
            status,
        })
    }

    fn incomplete_trip(&self, start: &TapEvent) -> Result<TripRecord, ReconError> {
        let charge_cents = self.graph.cost(&start.stop_id, None)?;

        Ok(TripRecord {
            started: start.tapped_at,
            finished: None,
            duration_secs: None,
            from_stop_id: start.stop_id.clone(),
            to_stop_id: None,
            charge_cents,
            company_id: start.company_id.clone(),
            bus_id: start.bus_id.clone(),
            pan: start.pan.clone(),
            status: TripStatus::Incomplete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimestampPolicy;
    use chrono::{DateTime, NaiveDateTime, Utc};

    fn at(ts: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn tap(id: i64, ts: &str, tap_type: TapType, stop: &str, bus: &str, pan: &str) -> TapEvent {
        TapEvent {
            id,
            tapped_at: at(ts),
            tap_type,
            stop_id: stop.into(),
            company_id: "Company1".into(),
            bus_id: bus.into(),
            pan: pan.into(),
        }
    }

    fn graph() -> FareGraph {
        let mut g = FareGraph::new();
        g.add_edge("Stop1", "Stop2", 325).unwrap();
        g.add_edge("Stop2", "Stop3", 550).unwrap();
        g.add_edge("Stop1", "Stop3", 730).unwrap();
        g.compute_fallback_costs().unwrap();
        g
    }

    fn process(events: &[TapEvent]) -> ReconOutput {
        let g = graph();
        TripReconciler::new(&g).process_events(events).unwrap()
    }

    #[test]
    fn completed_trip() {
        let out = process(&[
            tap(1, "2023-01-22 13:00:00", TapType::On, "Stop1", "Bus37", "X"),
            tap(2, "2023-01-22 13:05:00", TapType::Off, "Stop2", "Bus37", "X"),
        ]);
        assert_eq!(out.trips.len(), 1);
        let t = &out.trips[0];
        assert_eq!(t.started, at("2023-01-22 13:00:00"));
        assert_eq!(t.finished, Some(at("2023-01-22 13:05:00")));
        assert_eq!(t.duration_secs, Some(300));
        assert_eq!(t.from_stop_id, "Stop1");
        assert_eq!(t.to_stop_id.as_deref(), Some("Stop2"));
        assert_eq!(t.charge_cents, 325);
        assert_eq!(t.status, TripStatus::Completed);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn incomplete_at_end_of_input() {
        let out = process(&[tap(1, "2023-01-22 09:20:00", TapType::On, "Stop3", "Bus36", "Y")]);
        assert_eq!(out.trips.len(), 1);
        let t = &out.trips[0];
        assert_eq!(t.status, TripStatus::Incomplete);
        assert_eq!(t.charge_cents, 730);
        assert_eq!(t.finished, None);
        assert_eq!(t.duration_secs, None);
        assert_eq!(t.to_stop_id, None);
    }

    #[test]
    fn cancelled_trip_is_free() {
        let out = process(&[
            tap(1, "2023-01-23 08:00:00", TapType::On, "Stop1", "Bus37", "Z"),
            tap(2, "2023-01-23 08:02:00", TapType::Off, "Stop1", "Bus37", "Z"),
        ]);
        let t = &out.trips[0];
        assert_eq!(t.status, TripStatus::Cancelled);
        assert_eq!(t.duration_secs, Some(120));
        assert_eq!(t.to_stop_id.as_deref(), Some("Stop1"));
        assert_eq!(t.charge_cents, 0);
    }

    #[test]
    fn superseding_tap_on() {
        let out = process(&[
            tap(1, "2023-01-22 10:00:00", TapType::On, "Stop1", "Bus1", "W"),
            tap(2, "2023-01-22 11:00:00", TapType::On, "Stop1", "Bus2", "W"),
            tap(3, "2023-01-22 11:10:00", TapType::Off, "Stop2", "Bus2", "W"),
        ]);
        assert_eq!(out.trips.len(), 2);
        assert_eq!(out.trips[0].status, TripStatus::Incomplete);
        assert_eq!(out.trips[0].bus_id, "Bus1");
        assert_eq!(out.trips[0].charge_cents, 730);
        assert_eq!(out.trips[1].status, TripStatus::Completed);
        assert_eq!(out.trips[1].bus_id, "Bus2");
        assert_eq!(out.trips[1].duration_secs, Some(600));
        assert_eq!(out.trips[1].charge_cents, 325);
    }

    #[test]
    fn superseding_tap_on_left_open_is_flushed() {
        let out = process(&[
            tap(1, "2023-01-22 10:00:00", TapType::On, "Stop1", "Bus1", "W"),
            tap(2, "2023-01-22 11:00:00", TapType::On, "Stop1", "Bus2", "W"),
        ]);
        assert_eq!(out.trips.len(), 2);
        assert!(out.trips.iter().all(|t| t.status == TripStatus::Incomplete));
        assert_eq!(out.trips[0].started, at("2023-01-22 10:00:00"));
        assert_eq!(out.trips[1].started, at("2023-01-22 11:00:00"));
    }

    #[test]
    fn orphan_tap_off_is_skipped() {
        let out = process(&[tap(7, "2023-01-22 10:00:00", TapType::Off, "Stop2", "Bus1", "V")]);
        assert!(out.trips.is_empty());
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::OrphanTapOff {
                tap_id: 7,
                pan: "V".into(),
                stop_id: "Stop2".into(),
            }]
        );
        assert_eq!(out.summary.orphan_tap_offs, 1);
    }

    #[test]
    fn interleaved_cards_keep_input_order() {
        let out = process(&[
            tap(1, "2023-01-22 10:00:00", TapType::On, "Stop1", "Bus1", "A"),
            tap(2, "2023-01-22 10:01:00", TapType::On, "Stop2", "Bus2", "B"),
            tap(3, "2023-01-22 10:05:00", TapType::Off, "Stop3", "Bus2", "B"),
            tap(4, "2023-01-22 10:06:00", TapType::Off, "Stop2", "Bus1", "A"),
        ]);
        assert_eq!(out.trips.len(), 2);
        assert_eq!(out.trips[0].pan, "B");
        assert_eq!(out.trips[0].charge_cents, 550);
        assert_eq!(out.trips[1].pan, "A");
        assert_eq!(out.trips[1].charge_cents, 325);
    }

    #[test]
    fn flush_follows_input_order_of_open_tap_ons() {
        let out = process(&[
            tap(1, "2023-01-22 10:00:00", TapType::On, "Stop1", "Bus1", "A"),
            tap(2, "2023-01-22 10:01:00", TapType::On, "Stop2", "Bus1", "B"),
            tap(3, "2023-01-22 10:02:00", TapType::On, "Stop3", "Bus1", "C"),
            // A taps on again: A's open entry now sits after B and C
            tap(4, "2023-01-22 10:03:00", TapType::On, "Stop3", "Bus1", "A"),
        ]);
        let pans: Vec<&str> = out.trips.iter().map(|t| t.pan.as_str()).collect();
        assert_eq!(pans, vec!["A", "B", "C", "A"]);
        assert_eq!(out.trips[0].from_stop_id, "Stop1");
        assert_eq!(out.trips[3].from_stop_id, "Stop3");
    }

    #[test]
    fn input_order_wins_over_timestamps() {
        // The tap-off for card A is listed before a later-timestamped tap-on
        // for card B; each card only sees its own taps in input order.
        let out = process(&[
            tap(1, "2023-01-22 12:00:00", TapType::On, "Stop1", "Bus1", "B"),
            tap(2, "2023-01-22 09:00:00", TapType::On, "Stop1", "Bus1", "A"),
            tap(3, "2023-01-22 09:10:00", TapType::Off, "Stop2", "Bus1", "A"),
        ]);
        assert_eq!(out.trips[0].pan, "A");
        assert_eq!(out.trips[1].pan, "B");
    }

    #[test]
    fn company_and_bus_come_from_tap_on() {
        let mut off = tap(2, "2023-01-22 13:05:00", TapType::Off, "Stop2", "Bus99", "X");
        off.company_id = "Company2".into();
        let out = process(&[tap(1, "2023-01-22 13:00:00", TapType::On, "Stop1", "Bus37", "X"), off]);
        assert_eq!(out.trips[0].bus_id, "Bus37");
        assert_eq!(out.trips[0].company_id, "Company1");
    }

    #[test]
    fn unknown_stop_aborts_pass() {
        let g = graph();
        let err = TripReconciler::new(&g)
            .process_events(&[
                tap(1, "2023-01-22 13:00:00", TapType::On, "Stop1", "Bus1", "X"),
                tap(2, "2023-01-22 13:05:00", TapType::Off, "Stop9", "Bus1", "X"),
            ])
            .unwrap_err();
        assert!(matches!(err, ReconError::InvalidRoute(_)));
    }

    #[test]
    fn unknown_stop_in_flush_aborts_pass() {
        let g = graph();
        let result = TripReconciler::new(&g)
            .process_events(&[tap(1, "2023-01-22 13:00:00", TapType::On, "Stop9", "Bus1", "X")]);
        assert!(result.is_err());
    }

    #[test]
    fn out_of_order_taps_rejected_by_default() {
        let g = graph();
        let err = TripReconciler::new(&g)
            .process_events(&[
                tap(1, "2023-01-22 13:05:00", TapType::On, "Stop1", "Bus1", "X"),
                tap(2, "2023-01-22 13:00:00", TapType::Off, "Stop2", "Bus1", "X"),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            ReconError::OutOfOrderTaps {
                start_id: 1,
                end_id: 2,
                pan: "X".into()
            }
        );
    }

    #[test]
    fn out_of_order_taps_clamped() {
        let g = graph();
        let config = ReconConfig {
            timestamp_policy: TimestampPolicy::Clamp,
        };
        let out = TripReconciler::with_config(&g, config)
            .process_events(&[
                tap(1, "2023-01-22 13:05:00", TapType::On, "Stop1", "Bus1", "X"),
                tap(2, "2023-01-22 13:00:00", TapType::Off, "Stop2", "Bus1", "X"),
            ])
            .unwrap();
        assert_eq!(out.trips[0].duration_secs, Some(0));
    }

    #[test]
    fn out_of_order_taps_passed_through() {
        let g = graph();
        let config = ReconConfig {
            timestamp_policy: TimestampPolicy::PassThrough,
        };
        let out = TripReconciler::with_config(&g, config)
            .process_events(&[
                tap(1, "2023-01-22 13:05:00", TapType::On, "Stop1", "Bus1", "X"),
                tap(2, "2023-01-22 13:00:00", TapType::Off, "Stop2", "Bus1", "X"),
            ])
            .unwrap();
        assert_eq!(out.trips[0].duration_secs, Some(-300));
    }

    #[test]
    fn route_error_wins_over_out_of_order_taps() {
        let g = graph();
        let err = TripReconciler::new(&g)
            .process_events(&[
                tap(1, "2023-01-22 13:05:00", TapType::On, "Stop1", "Bus1", "X"),
                tap(2, "2023-01-22 13:00:00", TapType::Off, "Stop9", "Bus1", "X"),
            ])
            .unwrap_err();
        assert_eq!(err, ReconError::InvalidRoute("unknown end stop 'Stop9'".into()));
    }

    #[test]
    fn empty_input() {
        let out = process(&[]);
        assert!(out.trips.is_empty());
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.summary.total_trips, 0);
    }
}
