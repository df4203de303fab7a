//! PyO3 wrapper for the fleet service
//!
//! Results cross the boundary as JSON strings rather than hand-built
//! dicts: the consumer is a JSON-speaking dashboard backend, and the read
//! API is value-copied anyway.

use std::path::Path;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::analytics::RouteStats;
use crate::orchestrator::{FleetService, SimulationConfig};
use crate::topology::RouteCatalog;

/// Python wrapper for the Rust fleet simulation.
///
/// # Example (from Python)
///
/// ```python
/// from fleet_simulator_core_rs import FleetSimulator
///
/// sim = FleetSimulator(config_json='{"rng_seed": 7}', topology_path=None)
/// sim.start()
/// buses = json.loads(sim.snapshot_buses())
/// kpis = json.loads(sim.kpis())
/// sim.stop()
/// ```
#[pyclass(name = "FleetSimulator")]
pub struct PyFleetSimulator {
    service: FleetService,
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyRuntimeError::new_err(format!("serialization failed: {e}")))
}

#[pymethods]
impl PyFleetSimulator {
    /// Create a simulator.
    ///
    /// `config_json` is the JSON form of the engine configuration; omitted
    /// fields take production defaults. `topology_path` points at a route
    /// feed; a missing or malformed feed falls back to the built-in
    /// synthetic network.
    #[new]
    #[pyo3(signature = (config_json=None, topology_path=None))]
    fn new(config_json: Option<&str>, topology_path: Option<&str>) -> PyResult<Self> {
        let config: SimulationConfig = match config_json {
            Some(text) => serde_json::from_str(text)
                .map_err(|e| PyValueError::new_err(format!("invalid config: {e}")))?,
            None => SimulationConfig::default(),
        };

        let catalog = RouteCatalog::load(topology_path.map(Path::new));
        let service = FleetService::new(catalog, config)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(Self { service })
    }

    /// Start the background tick loop. No-op if already running.
    fn start(&self) {
        self.service.start();
    }

    /// Stop the tick loop; returns False if the loop failed to exit within
    /// the bounded shutdown timeout.
    fn stop(&self) -> bool {
        self.service.stop()
    }

    fn is_running(&self) -> bool {
        self.service.is_running()
    }

    /// Drive one tick manually (headless/test use).
    fn step(&self, elapsed_seconds: f64) -> PyResult<String> {
        to_json(&self.service.step(elapsed_seconds))
    }

    fn current_tick(&self) -> u64 {
        self.service.current_tick()
    }

    /// JSON array of per-bus snapshots.
    fn snapshot_buses(&self) -> PyResult<String> {
        to_json(&self.service.snapshot_buses())
    }

    /// JSON object of fleet KPIs.
    fn kpis(&self) -> PyResult<String> {
        to_json(&self.service.kpis())
    }

    /// JSON array of per-route analytics rows.
    fn route_analytics(&self) -> PyResult<String> {
        to_json(&self.service.route_analytics())
    }

    /// JSON array of hour-of-day buckets over the current snapshot.
    fn temporal_patterns(&self) -> PyResult<String> {
        to_json(&self.service.temporal_patterns())
    }

    /// JSON array of the most recent simulation events.
    #[pyo3(signature = (limit=100))]
    fn recent_events(&self, limit: usize) -> PyResult<String> {
        to_json(&self.service.recent_events(limit))
    }

    /// Install external revenue/reliability statistics for a route.
    fn set_route_stats(&self, route_id: &str, revenue: f64, reliability: f64) {
        self.service.set_route_stats(
            route_id,
            RouteStats {
                revenue,
                reliability,
            },
        );
    }
}
