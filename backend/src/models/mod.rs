//! Domain types for the fleet simulation
//!
//! - `route`: immutable route polylines (waypoints/stops)
//! - `bus`: the mutable per-vehicle state and its wire snapshot
//! - `event`: simulation event log entries

pub mod bus;
pub mod event;
pub mod route;

pub use bus::{Bus, BusSnapshot, BusStatus};
pub use event::{Event, EventLog};
pub use route::{GeoPoint, Route, Waypoint};
