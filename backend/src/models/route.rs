//! Route model
//!
//! A route is an ordered polyline of waypoints (stops) that buses cycle
//! along. Routes are immutable after construction and owned solely by the
//! [`RouteCatalog`](crate::topology::RouteCatalog); buses refer to them by
//! catalog index, never by owning pointer.

use serde::{Deserialize, Serialize};

/// A point on the flat lat/lon plane.
///
/// Movement math treats coordinates as planar, not geodesic; at city scale
/// the error is irrelevant for a dashboard display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const ORIGIN: GeoPoint = GeoPoint { lat: 0.0, lon: 0.0 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A stop on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    /// Human-readable stop name; feeds may omit it.
    #[serde(default)]
    pub label: String,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64, label: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            label: label.into(),
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// An ordered polyline of waypoints a bus cycles along.
///
/// # Example
/// ```
/// use fleet_simulator_core_rs::{Route, Waypoint};
///
/// let route = Route::new(
///     "R-5A",
///     "Benz Circle Expr",
///     vec![
///         Waypoint::new(16.5062, 80.6480, "Benz Circle"),
///         Waypoint::new(16.5180, 80.6200, "Bus Station"),
///     ],
/// );
/// assert_eq!(route.len(), 2);
/// assert_eq!(route.waypoint(3).lat, route.waypoint(1).lat); // cyclic
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    id: String,
    name: String,
    waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn new(id: impl Into<String>, name: impl Into<String>, waypoints: Vec<Waypoint>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            waypoints,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Number of waypoints on the route.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint at a cyclic index.
    ///
    /// # Panics
    /// Panics if the route has no waypoints; callers must check
    /// [`is_empty`](Self::is_empty) first.
    pub fn waypoint(&self, index: usize) -> &Waypoint {
        &self.waypoints[index % self.waypoints.len()]
    }
}
