//! Fleet Simulator Core - Rust Engine
//!
//! Real-time bus fleet simulation engine behind the dashboard backend: a
//! mutable in-memory model of buses moving along routes, advanced on a
//! fixed cadence by a single cooperative writer and read concurrently by
//! any number of API handlers via value snapshots.
//!
//! # Architecture
//!
//! - **topology**: immutable route catalog with soft-fail feed ingestion
//! - **models**: domain types (Route, Bus, events)
//! - **kinematics**: pure movement math along a route polyline
//! - **delay**: stochastic delay state machine and its speed mapping
//! - **orchestrator**: engine state, tick clock, and the service facade
//! - **analytics**: read-side KPIs, per-route rows, temporal buckets
//! - **predict**: external predictor seam and its heuristic fallback
//! - **rng**: deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Only the tick path mutates buses; every read is a value copy
//! 2. All randomness is deterministic (seeded RNG, never wall-clock)
//! 3. Per-bus invariants hold after every tick: progress in `[0, 1)`,
//!    occupancy in `[0, 100]`, position on the current segment

// Module declarations
pub mod analytics;
pub mod delay;
pub mod kinematics;
pub mod models;
pub mod orchestrator;
pub mod predict;
pub mod rng;
pub mod topology;

// Re-exports for convenience
pub use analytics::{KpiSummary, RouteAnalytics, RouteStats, RouteStatsTable, TemporalBucket};
pub use delay::{speed_factor, DelayBand, DelayConfig};
pub use kinematics::{Advance, KinematicsConfig, BASE_SPEED_KMH};
pub use models::{
    bus::{Bus, BusSnapshot, BusStatus},
    event::{Event, EventLog},
    route::{GeoPoint, Route, Waypoint},
};
pub use orchestrator::{
    BusPlan, FleetEngine, FleetService, SimulationClock, SimulationConfig, SimulationError,
    TickResult,
};
pub use predict::{HeuristicPredictor, Predictor};
pub use rng::SimRng;
pub use topology::{RouteCatalog, TopologyError, MAX_ROUTES};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn fleet_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulator::PyFleetSimulator>()?;
    Ok(())
}
