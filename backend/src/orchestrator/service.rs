//! Fleet service - the single-writer / multi-reader facade
//!
//! Bundles the shared engine with its clock and exposes the full read and
//! lifecycle API. The clock thread is the one writer; an unbounded number
//! of concurrent readers take the read lock, copy values out, and release
//! it. Readers never block on the writer beyond one in-flight tick and
//! never suspend waiting for a tick boundary.
//!
//! All reads materialize value copies under the lock; no live reference to
//! engine state escapes the facade.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use crate::analytics::{KpiSummary, RouteAnalytics, RouteStats, TemporalBucket};
use crate::models::bus::BusSnapshot;
use crate::models::event::Event;
use crate::orchestrator::clock::SimulationClock;
use crate::orchestrator::engine::{FleetEngine, SimulationConfig, SimulationError, TickResult};
use crate::topology::RouteCatalog;

/// Thread-safe handle to a running fleet simulation.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
///
/// # Example
/// ```no_run
/// use fleet_simulator_core_rs::{FleetService, RouteCatalog, SimulationConfig};
///
/// let service = FleetService::new(RouteCatalog::load(None), SimulationConfig::default()).unwrap();
/// service.start();
///
/// let kpis = service.kpis();
/// println!("{} buses active, {} delayed", kpis.active_buses, kpis.delayed_buses);
///
/// service.stop();
/// ```
pub struct FleetService {
    engine: Arc<RwLock<FleetEngine>>,
    clock: Mutex<SimulationClock>,
}

impl FleetService {
    /// Build the engine and its clock from a catalog and configuration.
    pub fn new(catalog: RouteCatalog, config: SimulationConfig) -> Result<Self, SimulationError> {
        let tick_interval_secs = config.tick_interval_secs;

        // The engine constructor validates the config, including the tick
        // interval, so the Duration conversion below cannot panic
        let engine = Arc::new(RwLock::new(FleetEngine::new(catalog, config)?));
        let clock = SimulationClock::new(
            Arc::clone(&engine),
            Duration::from_secs_f64(tick_interval_secs),
        );

        Ok(Self {
            engine,
            clock: Mutex::new(clock),
        })
    }

    /// Convenience constructor: load the topology (soft, with fallback)
    /// and build the service.
    pub fn from_topology(
        path: Option<&Path>,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        Self::new(RouteCatalog::load(path), config)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start the clock. No-op while it is already running.
    pub fn start(&self) {
        self.clock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .start();
    }

    /// Stop the clock, waiting for loop exit with a bounded timeout.
    ///
    /// Idempotent. Returns `false` only when the loop failed to exit
    /// within the timeout.
    pub fn stop(&self) -> bool {
        self.clock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop()
    }

    pub fn is_running(&self) -> bool {
        self.clock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_running()
    }

    /// Drive one tick manually.
    ///
    /// Intended for headless and test use with the clock stopped; while
    /// the clock runs it simply interleaves with its ticks.
    pub fn step(&self, elapsed_seconds: f64) -> TickResult {
        self.engine
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .tick(elapsed_seconds)
    }

    // ========================================================================
    // Read API
    // ========================================================================

    /// Value snapshot of the whole fleet, taken under one read lock.
    pub fn snapshot_buses(&self) -> Vec<BusSnapshot> {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot_buses()
    }

    pub fn kpis(&self) -> KpiSummary {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .kpis()
    }

    pub fn route_analytics(&self) -> Vec<RouteAnalytics> {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .route_analytics()
    }

    pub fn temporal_patterns(&self) -> Vec<TemporalBucket> {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .temporal_patterns()
    }

    /// The most recent `limit` events, oldest first.
    pub fn recent_events(&self, limit: usize) -> Vec<Event> {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .event_log()
            .recent(limit)
    }

    pub fn current_tick(&self) -> u64 {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current_tick()
    }

    /// Install external statistics for a route.
    pub fn set_route_stats(&self, route_id: impl Into<String>, stats: RouteStats) {
        self.engine
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_route_stats(route_id, stats);
    }
}
