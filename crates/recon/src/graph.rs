use std::collections::{BTreeMap, BTreeSet};

use crate::error::ReconError;

/// Fare charged when a rider taps off where they tapped on.
pub const CANCELLED_TRIP_CENTS: i64 = 0;

/// Largest fare a single edge may carry: 1,000,000.00 in minor units.
/// Keeps per-run charge totals far inside `i64`.
pub const MAX_FARE_CENTS: i64 = 100_000_000;

/// Unordered stop pair, normalized so `low <= high`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct StopPair {
    low: String,
    high: String,
}

impl StopPair {
    fn new(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.to_string(),
            high: high.to_string(),
        }
    }
}

/// Flat fare lookup table between stop pairs.
///
/// Built once by [`FareGraph::add_edge`] calls followed by
/// [`FareGraph::compute_fallback_costs`], then queried read-only. There is no
/// path finding: a pair without an edge has no fare.
#[derive(Debug, Clone, Default)]
pub struct FareGraph {
    stops: BTreeSet<String>,
    costs: BTreeMap<StopPair, i64>,
    fallbacks: BTreeMap<String, i64>,
    /// Set by `add_edge`, cleared by `compute_fallback_costs`.
    fallbacks_stale: bool,
}

impl FareGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fare between two distinct stops. A repeated pair (in either
    /// order) overwrites the earlier cost.
    pub fn add_edge(&mut self, start: &str, end: &str, cost_cents: i64) -> Result<(), ReconError> {
        if start.is_empty() {
            return Err(ReconError::route("fare edge start stop id is empty"));
        }
        if end.is_empty() {
            return Err(ReconError::route("fare edge end stop id is empty"));
        }
        if start == end {
            return Err(ReconError::route(format!(
                "fare edge '{start}' -> '{end}': start and end stop must differ"
            )));
        }
        if cost_cents < 0 {
            return Err(ReconError::route(format!(
                "fare edge '{start}' -> '{end}': cost cannot be negative ({cost_cents})"
            )));
        }
        if cost_cents > MAX_FARE_CENTS {
            return Err(ReconError::route(format!(
                "fare edge '{start}' -> '{end}': cost {cost_cents} exceeds the maximum of {MAX_FARE_CENTS}"
            )));
        }

        self.stops.insert(start.to_string());
        self.stops.insert(end.to_string());
        if let Some(previous) = self.costs.insert(StopPair::new(start, end), cost_cents) {
            if previous != cost_cents {
                log::debug!("fare '{start}' <-> '{end}' overwritten: {previous} -> {cost_cents}");
            }
        }
        self.fallbacks_stale = true;
        Ok(())
    }

    /// Recompute every stop's fallback fare: the maximum cost over its edges.
    pub fn compute_fallback_costs(&mut self) -> Result<(), ReconError> {
        let mut fallbacks: BTreeMap<String, i64> = BTreeMap::new();
        for (pair, &cost) in &self.costs {
            for stop in [&pair.low, &pair.high] {
                let entry = fallbacks.entry(stop.clone()).or_insert(cost);
                if cost > *entry {
                    *entry = cost;
                }
            }
        }

        if let Some(orphan) = self.stops.iter().find(|s| !fallbacks.contains_key(*s)) {
            return Err(ReconError::route(format!(
                "stop '{orphan}' has no fare edges, cannot compute a fallback fare"
            )));
        }

        self.fallbacks = fallbacks;
        self.fallbacks_stale = false;
        log::debug!(
            "computed fallback fares for {} stops over {} edges",
            self.fallbacks.len(),
            self.costs.len()
        );
        Ok(())
    }

    /// Fare for a journey.
    ///
    /// - `end` absent: the start stop's fallback fare (unknown destination)
    /// - `end == start`: free (cancelled trip), even without an edge
    /// - otherwise: the registered edge cost
    pub fn cost(&self, start: &str, end: Option<&str>) -> Result<i64, ReconError> {
        if !self.stops.contains(start) {
            return Err(ReconError::route(format!("unknown start stop '{start}'")));
        }

        let Some(end) = end else {
            return self.fallback_cost(start);
        };

        if !self.stops.contains(end) {
            return Err(ReconError::route(format!("unknown end stop '{end}'")));
        }
        if end == start {
            return Ok(CANCELLED_TRIP_CENTS);
        }

        self.costs
            .get(&StopPair::new(start, end))
            .copied()
            .ok_or_else(|| {
                ReconError::route(format!("no fare defined between '{start}' and '{end}'"))
            })
    }

    /// The fallback fare for `stop`. Fails if fallbacks were never computed,
    /// or edges were added since the last computation.
    pub fn fallback_cost(&self, stop: &str) -> Result<i64, ReconError> {
        if self.fallbacks_stale {
            return Err(ReconError::route(format!(
                "fallback fare for '{stop}' is out of date, fare edges changed since the last computation"
            )));
        }
        self.fallbacks
            .get(stop)
            .copied()
            .ok_or_else(|| ReconError::route(format!("no fallback fare for stop '{stop}'")))
    }

    pub fn contains_stop(&self, stop: &str) -> bool {
        self.stops.contains(stop)
    }

    /// Known stops in sorted order.
    pub fn stops(&self) -> impl Iterator<Item = &str> {
        self.stops.iter().map(String::as_str)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn edge_count(&self) -> usize {
        self.costs.len()
    }
}
