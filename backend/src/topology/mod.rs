//! Route catalog - topology ingestion with soft failure
//!
//! Routes come from an external topology feed: a JSON array of
//! `{ "route_id", "name", "waypoints": [{lat, lon, label}] }` entries. The
//! feed is untrusted operational data, so the loader degrades instead of
//! failing the process:
//! - routes with fewer than two waypoints are skipped (degenerate rows)
//! - ingestion stops after [`MAX_ROUTES`] routes
//! - any I/O or parse failure falls back to a small built-in synthetic
//!   network, keeping the rest of the system operable
//!
//! The catalog is immutable after construction. Buses reference routes by
//! catalog index; the catalog is the sole owner.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::route::{Route, Waypoint};

/// Hard cap on the number of routes ingested from a feed.
pub const MAX_ROUTES: usize = 50;

/// Errors that can occur while ingesting a topology feed.
///
/// These never escape [`RouteCatalog::load`]; they exist so the strict
/// entry points ([`RouteCatalog::from_file`], [`RouteCatalog::from_json`])
/// can report what went wrong.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("failed to read topology feed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse topology feed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("topology feed contains no usable routes")]
    Empty,
}

/// One entry of the external topology feed.
#[derive(Debug, Deserialize)]
struct RouteFeedEntry {
    route_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    waypoints: Vec<Waypoint>,
}

/// Immutable, order-preserving set of routes.
///
/// # Example
/// ```
/// use fleet_simulator_core_rs::RouteCatalog;
///
/// // No feed available: the built-in synthetic network is used.
/// let catalog = RouteCatalog::load(None);
/// assert!(!catalog.is_empty());
/// assert!(catalog.get("R-5A").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    routes: Vec<Route>,
    index_by_id: HashMap<String, usize>,
}

impl RouteCatalog {
    /// Build a catalog from already-constructed routes.
    ///
    /// Order is preserved. A route whose id was already seen is skipped;
    /// the first occurrence wins.
    pub fn new(routes: Vec<Route>) -> Self {
        let mut unique = Vec::with_capacity(routes.len());
        let mut index_by_id = HashMap::with_capacity(routes.len());

        for route in routes {
            if index_by_id.contains_key(route.id()) {
                continue;
            }
            index_by_id.insert(route.id().to_string(), unique.len());
            unique.push(route);
        }

        Self {
            routes: unique,
            index_by_id,
        }
    }

    /// Load a topology feed, falling back to the synthetic network.
    ///
    /// This is the soft entry point used at startup: a missing path, an
    /// unreadable file, a malformed feed, or a feed with no usable routes
    /// all yield [`RouteCatalog::fallback`] so a degraded simulation beats
    /// an unavailable dashboard.
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::from_file(path).unwrap_or_else(|_| Self::fallback()),
            None => Self::fallback(),
        }
    }

    /// Parse a topology feed file. Strict: errors are reported, not masked.
    pub fn from_file(path: &Path) -> Result<Self, TopologyError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a topology feed from JSON text.
    ///
    /// Degenerate entries (fewer than two waypoints) are skipped and
    /// ingestion is capped at [`MAX_ROUTES`]. An empty result is an error;
    /// the soft path maps it to the fallback network.
    pub fn from_json(text: &str) -> Result<Self, TopologyError> {
        let entries: Vec<RouteFeedEntry> = serde_json::from_str(text)?;

        let mut routes = Vec::new();
        for entry in entries {
            if routes.len() == MAX_ROUTES {
                break;
            }
            if entry.waypoints.len() < 2 {
                continue;
            }
            let name = entry
                .name
                .unwrap_or_else(|| format!("Route {}", entry.route_id));
            routes.push(Route::new(entry.route_id, name, entry.waypoints));
        }

        if routes.is_empty() {
            return Err(TopologyError::Empty);
        }

        Ok(Self::new(routes))
    }

    /// The built-in synthetic network: three routes around Vijayawada
    /// (approx lat 16.5, lon 80.6).
    pub fn fallback() -> Self {
        let benz_circle = Route::new(
            "R-5A",
            "Benz Circle Expr",
            vec![
                Waypoint::new(16.5062, 80.6480, "Benz Circle"),
                Waypoint::new(16.5100, 80.6400, "Stop"),
                Waypoint::new(16.5150, 80.6300, "Stop"),
                Waypoint::new(16.5180, 80.6200, "Bus Station"),
            ],
        );

        let city_loop = Route::new(
            "R-12B",
            "City Loop",
            vec![
                Waypoint::new(16.5200, 80.6200, "Stop"),
                Waypoint::new(16.5250, 80.6250, "Stop"),
                Waypoint::new(16.5300, 80.6350, "Stop"),
            ],
        );

        let industrial_park = Route::new(
            "R-47C",
            "Ind. Park Line",
            vec![
                Waypoint::new(16.5000, 80.6000, "Stop"),
                Waypoint::new(16.5050, 80.6100, "Stop"),
                Waypoint::new(16.5100, 80.6200, "Stop"),
            ],
        );

        Self::new(vec![benz_circle, city_loop, industrial_park])
    }

    /// Look up a route by id.
    pub fn get(&self, route_id: &str) -> Option<&Route> {
        self.index_by_id.get(route_id).map(|&i| &self.routes[i])
    }

    /// Catalog index of a route id, if present.
    pub fn index_of(&self, route_id: &str) -> Option<usize> {
        self.index_by_id.get(route_id).copied()
    }

    /// Route at a catalog index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds. Bus route indices are validated
    /// at fleet construction, so the engine never hits this.
    pub fn route_at(&self, index: usize) -> &Route {
        &self.routes[index]
    }

    /// All routes in feed order.
    pub fn all(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
