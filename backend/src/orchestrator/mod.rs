//! Orchestrator - engine state, tick clock, and the service facade
//!
//! See `engine.rs` for the tick loop, `clock.rs` for the cooperative
//! writer thread, and `service.rs` for the shared read/lifecycle facade.

pub mod clock;
pub mod engine;
pub mod service;

// Re-export main types for convenience
pub use clock::SimulationClock;
pub use engine::{BusPlan, FleetEngine, SimulationConfig, SimulationError, TickResult};
pub use service::FleetService;
