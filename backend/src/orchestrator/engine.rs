//! Fleet engine - the mutable simulation state and its tick function
//!
//! Owns the route catalog, the fleet, the injected RNG, and the event log.
//! `tick` is the only mutation path: it applies kinematics and the delay
//! state machine to every bus, records events, and stamps update times.
//! Every read goes through value-copying accessors so no live reference
//! escapes the engine.
//!
//! # Determinism
//!
//! All randomness goes through the seeded [`SimRng`]: fleet seeding,
//! occupancy exchanges, and status transitions. Same seed + same config
//! gives an identical fleet evolution (timestamps excepted - they record
//! wall time for the temporal queries).
//!
//! # Example
//!
//! ```rust
//! use fleet_simulator_core_rs::{FleetEngine, RouteCatalog, SimulationConfig};
//!
//! let catalog = RouteCatalog::load(None);
//! let mut engine = FleetEngine::new(catalog, SimulationConfig::default()).unwrap();
//!
//! for _ in 0..10 {
//!     let result = engine.tick(1.0);
//!     println!("tick {}: {} buses moved", result.tick, result.buses_updated);
//! }
//!
//! let kpis = engine.kpis();
//! assert!(kpis.active_buses >= kpis.delayed_buses);
//! ```

use std::collections::HashSet;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{
    self, KpiSummary, RouteAnalytics, RouteStats, RouteStatsTable, TemporalBucket,
};
use crate::delay::{self, DelayConfig};
use crate::kinematics::{self, KinematicsConfig};
use crate::models::bus::{Bus, BusSnapshot};
use crate::models::event::{Event, EventLog};
use crate::rng::SimRng;
use crate::topology::RouteCatalog;

/// Bounds of the passenger exchange at a stop, inclusive.
const OCCUPANCY_EXCHANGE_MIN: i64 = -5;
const OCCUPANCY_EXCHANGE_MAX: i64 = 10;

/// Initial occupancy range for seeded buses, inclusive.
const INITIAL_OCCUPANCY_MIN: i64 = 10;
const INITIAL_OCCUPANCY_MAX: i64 = 50;

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete engine configuration.
///
/// JSON-deserializable so the embedding layer can configure the engine the
/// same way it would over a config file; every field has a production
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock tick period in seconds; also the nominal
    /// `elapsed_seconds` handed to each tick.
    pub tick_interval_secs: f64,

    /// Seed for the injected RNG.
    pub rng_seed: u64,

    pub kinematics: KinematicsConfig,
    pub delay: DelayConfig,

    /// Explicit fleet layout. Empty means auto-seed: one bus per route
    /// plus a 50%-chance second bus, each at a random start segment.
    pub fleet: Vec<BusPlan>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 1.0,
            rng_seed: 42,
            kinematics: KinematicsConfig::default(),
            delay: DelayConfig::default(),
            fleet: Vec::new(),
        }
    }
}

/// One planned bus of an explicit fleet layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusPlan {
    pub id: String,

    /// Id of the route this bus is bound to; must exist in the catalog.
    pub route_id: String,

    /// Starting waypoint index (cyclic).
    #[serde(default)]
    pub segment_index: usize,

    /// Starting progress along the segment, `0.0 <= progress < 1.0`.
    #[serde(default)]
    pub progress: f64,

    /// Starting occupancy percent; `None` draws from the seeded range.
    #[serde(default)]
    pub occupancy: Option<i64>,
}

impl BusPlan {
    /// Plan a bus at the start of a route with defaults for the rest.
    pub fn new(id: impl Into<String>, route_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            route_id: route_id.into(),
            segment_index: 0,
            progress: 0.0,
            occupancy: None,
        }
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    /// Tick number, 1-based.
    pub tick: u64,

    /// Number of buses updated (the whole fleet).
    pub buses_updated: usize,

    /// Buses that reached a stop this tick.
    pub stop_arrivals: usize,

    /// Delay-state resamples that fired this tick.
    pub status_transitions: usize,
}

/// Simulation error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown route: {0}")]
    UnknownRoute(String),
}

// ============================================================================
// Engine
// ============================================================================

/// The in-memory fleet simulation.
#[derive(Debug)]
pub struct FleetEngine {
    catalog: RouteCatalog,
    buses: Vec<Bus>,
    route_stats: RouteStatsTable,
    rng: SimRng,
    kinematics: KinematicsConfig,
    delay: DelayConfig,
    event_log: EventLog,
    tick_number: u64,
}

impl FleetEngine {
    /// Create an engine over a catalog.
    ///
    /// Validates the configuration, then constructs the fleet: the
    /// explicit plan when one is given, the auto-seeded layout otherwise.
    /// Routes and buses are fixed for the engine's lifetime.
    pub fn new(catalog: RouteCatalog, config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::validate_config(&catalog, &config)?;

        let mut rng = SimRng::new(config.rng_seed);
        let buses = if config.fleet.is_empty() {
            Self::auto_fleet(&catalog, &mut rng)
        } else {
            Self::planned_fleet(&catalog, &config.fleet, &mut rng)
        };

        Ok(Self {
            catalog,
            buses,
            route_stats: RouteStatsTable::new(),
            rng,
            kinematics: config.kinematics,
            delay: config.delay,
            event_log: EventLog::new(),
            tick_number: 0,
        })
    }

    fn validate_config(
        catalog: &RouteCatalog,
        config: &SimulationConfig,
    ) -> Result<(), SimulationError> {
        if !config.tick_interval_secs.is_finite()
            || config.tick_interval_secs <= 0.0
            || config.tick_interval_secs > 3600.0
        {
            return Err(SimulationError::InvalidConfig(format!(
                "tick_interval_secs must be in (0, 3600], got {}",
                config.tick_interval_secs
            )));
        }

        if !config.kinematics.base_rate_deg_per_sec.is_finite()
            || config.kinematics.base_rate_deg_per_sec <= 0.0
        {
            return Err(SimulationError::InvalidConfig(
                "base_rate_deg_per_sec must be positive".to_string(),
            ));
        }
        if !config.kinematics.min_segment_distance.is_finite()
            || config.kinematics.min_segment_distance <= 0.0
        {
            return Err(SimulationError::InvalidConfig(
                "min_segment_distance must be positive".to_string(),
            ));
        }

        config
            .delay
            .validate()
            .map_err(SimulationError::InvalidConfig)?;

        let mut ids = HashSet::new();
        for plan in &config.fleet {
            if !ids.insert(&plan.id) {
                return Err(SimulationError::InvalidConfig(format!(
                    "duplicate bus id: {}",
                    plan.id
                )));
            }
            if catalog.index_of(&plan.route_id).is_none() {
                return Err(SimulationError::UnknownRoute(plan.route_id.clone()));
            }
            if !plan.progress.is_finite() || !(0.0..1.0).contains(&plan.progress) {
                return Err(SimulationError::InvalidConfig(format!(
                    "bus {} progress must be in [0, 1), got {}",
                    plan.id, plan.progress
                )));
            }
        }

        Ok(())
    }

    /// One bus per route plus a 50%-chance second, each starting at a
    /// random waypoint with a random initial load.
    fn auto_fleet(catalog: &RouteCatalog, rng: &mut SimRng) -> Vec<Bus> {
        let mut buses = Vec::new();
        for (route_index, route) in catalog.all().iter().enumerate() {
            let count = if rng.chance(0.5) { 2 } else { 1 };
            for n in 1..=count {
                let id = format!("BUS-{}-{}", route.id(), n);
                let segment = if route.len() >= 2 {
                    rng.range_i64(0, (route.len() - 1) as i64) as usize
                } else {
                    0
                };
                let occupancy = rng.range_i64(INITIAL_OCCUPANCY_MIN, INITIAL_OCCUPANCY_MAX + 1);

                let mut bus = Bus::new(id, route_index, route, occupancy);
                bus.place_at(route, segment, 0.0);
                buses.push(bus);
            }
        }
        buses
    }

    fn planned_fleet(catalog: &RouteCatalog, plans: &[BusPlan], rng: &mut SimRng) -> Vec<Bus> {
        plans
            .iter()
            .map(|plan| {
                // Existence validated in validate_config
                let route_index = catalog.index_of(&plan.route_id).unwrap_or_default();
                let route = catalog.route_at(route_index);

                let occupancy = plan.occupancy.unwrap_or_else(|| {
                    rng.range_i64(INITIAL_OCCUPANCY_MIN, INITIAL_OCCUPANCY_MAX + 1)
                });

                let mut bus = Bus::new(plan.id.clone(), route_index, route, occupancy);
                bus.place_at(route, plan.segment_index, plan.progress);
                bus
            })
            .collect()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Ticks executed so far.
    pub fn current_tick(&self) -> u64 {
        self.tick_number
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Install external statistics for a route.
    ///
    /// Entries are keyed by feed route id and summed into the KPI revenue
    /// even when the id is absent from the catalog; the external feeds may
    /// cover more routes than the simulation ingested.
    pub fn set_route_stats(&mut self, route_id: impl Into<String>, stats: RouteStats) {
        self.route_stats.set(route_id, stats);
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Execute one simulation tick.
    ///
    /// Applies, per bus: kinematics at the speed factor of the current
    /// delay state, the passenger exchange when a stop is reached, then
    /// the delay state machine. Each bus's update is a bounded,
    /// non-suspending computation; a reader never observes a bus half
    /// updated.
    pub fn tick(&mut self, elapsed_seconds: f64) -> TickResult {
        self.tick_number += 1;
        let tick = self.tick_number;
        let now = SystemTime::now();

        let mut stop_arrivals = 0;
        let mut status_transitions = 0;

        for bus in &mut self.buses {
            let route = self.catalog.route_at(bus.route_index());

            let factor = delay::speed_factor(bus.status());
            let advance = kinematics::advance(
                route,
                bus.segment_index(),
                bus.progress(),
                elapsed_seconds,
                factor,
                &self.kinematics,
            );
            bus.apply_advance(&advance);

            if advance.arrived_at_stop {
                let before = bus.occupancy();
                let delta = self
                    .rng
                    .range_i64(OCCUPANCY_EXCHANGE_MIN, OCCUPANCY_EXCHANGE_MAX + 1);
                bus.exchange_occupancy(delta);

                self.event_log.log(Event::StopArrival {
                    tick,
                    bus_id: bus.id().to_string(),
                    route_id: route.id().to_string(),
                    stop_label: route.waypoint(advance.segment_index).label.clone(),
                    occupancy_change: bus.occupancy() - before,
                    occupancy: bus.occupancy(),
                });
                stop_arrivals += 1;
            }

            if let Some((status, minutes)) = delay::maybe_transition(&self.delay, &mut self.rng) {
                let from = bus.status();
                bus.set_status(status, minutes);

                self.event_log.log(Event::StatusTransition {
                    tick,
                    bus_id: bus.id().to_string(),
                    from,
                    to: status,
                    delay_minutes: minutes,
                });
                status_transitions += 1;
            }

            bus.touch(now);
        }

        TickResult {
            tick,
            buses_updated: self.buses.len(),
            stop_arrivals,
            status_transitions,
        }
    }

    // ========================================================================
    // Read API
    // ========================================================================

    /// Value snapshot of the whole fleet.
    ///
    /// This is the single point where the bus set is materialized for
    /// consumers; everything is copied, no live reference escapes.
    pub fn snapshot_buses(&self) -> Vec<BusSnapshot> {
        self.buses
            .iter()
            .map(|bus| bus.snapshot(self.catalog.route_at(bus.route_index()).id()))
            .collect()
    }

    pub fn kpis(&self) -> KpiSummary {
        analytics::kpis(&self.buses, &self.catalog, &self.route_stats)
    }

    pub fn route_analytics(&self) -> Vec<RouteAnalytics> {
        analytics::route_analytics(&self.buses, &self.catalog, &self.route_stats)
    }

    pub fn temporal_patterns(&self) -> Vec<TemporalBucket> {
        analytics::temporal_patterns(&self.buses)
    }
}
