//! Read-side aggregation
//!
//! Stateless queries over the current fleet and route catalog, plus the
//! externally supplied per-route statistics (revenue, reliability). Each
//! query evaluates one consistent materialized state; callers take the
//! read lock once and hand these functions plain slices.
//!
//! `temporal_patterns` buckets the *current* snapshot of buses by the
//! hour-of-day of each bus's last update. It is a single-snapshot
//! cross-section, not a time series - callers must not assume historical
//! semantics.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::bus::{epoch_seconds, Bus};
use crate::topology::RouteCatalog;

/// Demand proxy per occupancy point (passenger-count placeholder used by
/// the dashboard).
const DEMAND_PER_OCCUPANCY_POINT: f64 = 10.0;

/// Externally supplied statistics for one route.
///
/// Populated out-of-band (ticketing and reliability feeds); absent entries
/// default to neutral values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStats {
    pub revenue: f64,
    /// Percentage, 100.0 = fully reliable.
    pub reliability: f64,
}

impl Default for RouteStats {
    fn default() -> Self {
        Self {
            revenue: 0.0,
            reliability: 100.0,
        }
    }
}

/// Key-value lookup of external per-route statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteStatsTable {
    stats: HashMap<String, RouteStats>,
}

impl RouteStatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the statistics for a route, replacing any previous entry.
    pub fn set(&mut self, route_id: impl Into<String>, stats: RouteStats) {
        self.stats.insert(route_id.into(), stats);
    }

    /// Statistics for a route; a miss yields the documented defaults
    /// (0 revenue, 100% reliability), never an error.
    pub fn get(&self, route_id: &str) -> RouteStats {
        self.stats.get(route_id).copied().unwrap_or_default()
    }

    /// Sum of revenue across every entry in the table.
    pub fn total_revenue(&self) -> f64 {
        self.stats.values().map(|s| s.revenue).sum()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Fleet-wide key performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// All buses count as active under the current simplification.
    pub active_buses: usize,
    pub total_routes: usize,
    /// Buses whose status is anything other than on-time.
    pub delayed_buses: usize,
    /// Mean occupancy across the fleet, one decimal; 0 for an empty fleet.
    pub avg_occupancy: f64,
    /// Summed external revenue across all known route statistics.
    pub total_revenue: f64,
}

/// Per-route analytics row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAnalytics {
    pub route_id: String,
    pub route_name: String,
    /// Mean delay over buses currently on the route, one decimal; 0 with
    /// no buses.
    pub avg_delay: f64,
    /// Mean occupancy over buses currently on the route, one decimal; 0
    /// with no buses.
    pub avg_occupancy: f64,
    /// Passenger-count proxy derived from mean occupancy.
    pub total_passengers: i64,
    /// `min(1, avg_occupancy / 100)`, two decimals.
    pub utilization_score: f64,
    pub revenue: f64,
    pub reliability: f64,
}

/// One hour-of-day bucket of the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalBucket {
    /// UTC hour of day, 0-23.
    pub hour: u8,
    pub bus_count: usize,
    pub avg_demand: f64,
    pub avg_occupancy: f64,
    pub avg_delay: f64,
}

/// Fleet-wide KPIs.
///
/// An empty fleet yields zero counts and `avg_occupancy = 0` - never a
/// division by zero.
pub fn kpis(buses: &[Bus], catalog: &RouteCatalog, stats: &RouteStatsTable) -> KpiSummary {
    let total_buses = buses.len();
    let delayed_buses = buses.iter().filter(|b| b.status().is_delayed()).count();

    let avg_occupancy = if total_buses > 0 {
        let total: i64 = buses.iter().map(|b| b.occupancy()).sum();
        round1(total as f64 / total_buses as f64)
    } else {
        0.0
    };

    KpiSummary {
        active_buses: total_buses,
        total_routes: catalog.len(),
        delayed_buses,
        avg_occupancy,
        total_revenue: stats.total_revenue(),
    }
}

/// Per-route analytics, one row per catalog route in feed order.
///
/// A route with no buses reports zero means but still carries its external
/// revenue/reliability.
pub fn route_analytics(
    buses: &[Bus],
    catalog: &RouteCatalog,
    stats: &RouteStatsTable,
) -> Vec<RouteAnalytics> {
    catalog
        .all()
        .iter()
        .enumerate()
        .map(|(route_index, route)| {
            let on_route: Vec<&Bus> = buses
                .iter()
                .filter(|b| b.route_index() == route_index)
                .collect();

            let (avg_delay, avg_occupancy) = if on_route.is_empty() {
                (0.0, 0.0)
            } else {
                let n = on_route.len() as f64;
                let delay: f64 = on_route.iter().map(|b| b.delay_minutes()).sum();
                let occupancy: i64 = on_route.iter().map(|b| b.occupancy()).sum();
                (delay / n, occupancy as f64 / n)
            };

            let external = stats.get(route.id());

            RouteAnalytics {
                route_id: route.id().to_string(),
                route_name: route.name().to_string(),
                avg_delay: round1(avg_delay),
                avg_occupancy: round1(avg_occupancy),
                total_passengers: (avg_occupancy * DEMAND_PER_OCCUPANCY_POINT) as i64,
                utilization_score: round2((avg_occupancy / 100.0).min(1.0)),
                revenue: external.revenue,
                reliability: external.reliability,
            }
        })
        .collect()
}

/// Hour-of-day buckets of the current snapshot, sorted by hour.
pub fn temporal_patterns(buses: &[Bus]) -> Vec<TemporalBucket> {
    struct Accumulator {
        count: usize,
        occupancy: i64,
        delay: f64,
    }

    let mut buckets: BTreeMap<u8, Accumulator> = BTreeMap::new();
    for bus in buses {
        let hour = ((epoch_seconds(bus.last_updated()) / 3600) % 24) as u8;
        let acc = buckets.entry(hour).or_insert(Accumulator {
            count: 0,
            occupancy: 0,
            delay: 0.0,
        });
        acc.count += 1;
        acc.occupancy += bus.occupancy();
        acc.delay += bus.delay_minutes();
    }

    buckets
        .into_iter()
        .map(|(hour, acc)| {
            let n = acc.count as f64;
            let avg_occupancy = acc.occupancy as f64 / n;
            TemporalBucket {
                hour,
                bus_count: acc.count,
                avg_demand: round1(avg_occupancy * DEMAND_PER_OCCUPANCY_POINT),
                avg_occupancy: round1(avg_occupancy),
                avg_delay: round1(acc.delay / n),
            }
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
