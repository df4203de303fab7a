//! Python interface (behind the `pyo3` feature)
//!
//! The dashboard backend embeds the engine as a native module. The FFI
//! boundary is minimal: construct, lifecycle, and JSON-string reads.

pub mod simulator;

pub use simulator::PyFleetSimulator;
