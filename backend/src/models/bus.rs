//! Bus (vehicle) model
//!
//! Represents a simulated vehicle permanently bound to one route. Each bus
//! carries:
//! - A cyclic position on its route polyline (`segment_index` + `progress`)
//! - A delay state and the delay magnitude drawn for that state
//! - An occupancy percentage exchanged at every stop arrival
//!
//! Buses are created once at engine startup and live for the process
//! lifetime. Only the tick path mutates them; everything else reads value
//! copies ([`BusSnapshot`]).
//!
//! CRITICAL: occupancy is clamped to `[0, 100]` after every adjustment and
//! `progress` stays in `[0.0, 1.0)` — readers may rely on both.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::kinematics::{Advance, BASE_SPEED_KMH};
use crate::models::route::{GeoPoint, Route};

/// Occupancy bounds, in percent.
pub const MAX_OCCUPANCY: i64 = 100;

/// Delay state of a bus.
///
/// The string forms (`"on-time"`, `"minor-delay"`, `"critical-delay"`) are
/// the wire values the dashboard consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusStatus {
    OnTime,
    MinorDelay,
    CriticalDelay,
}

impl BusStatus {
    /// Wire string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            BusStatus::OnTime => "on-time",
            BusStatus::MinorDelay => "minor-delay",
            BusStatus::CriticalDelay => "critical-delay",
        }
    }

    /// Whether the bus counts as delayed for KPI purposes.
    pub fn is_delayed(&self) -> bool {
        !matches!(self, BusStatus::OnTime)
    }
}

impl std::fmt::Display for BusStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A simulated vehicle bound to one route.
///
/// The route binding is an index into the engine's
/// [`RouteCatalog`](crate::topology::RouteCatalog), never an owning pointer.
///
/// # Example
/// ```
/// use fleet_simulator_core_rs::{Bus, BusStatus, Route, Waypoint};
///
/// let route = Route::new(
///     "R-1",
///     "Loop",
///     vec![Waypoint::new(0.0, 0.0, "a"), Waypoint::new(0.0, 1.0, "b")],
/// );
/// let bus = Bus::new("BUS-R-1-1", 0, &route, 30);
///
/// assert_eq!(bus.status(), BusStatus::OnTime);
/// assert_eq!(bus.position().lat, 0.0);
/// assert_eq!(bus.occupancy(), 30);
/// ```
#[derive(Debug, Clone)]
pub struct Bus {
    /// Unique bus identifier (e.g., "BUS-R-5A-1")
    id: String,

    /// Index of the bound route in the catalog (non-owning back-reference)
    route_index: usize,

    /// Index of the waypoint the bus last departed from (cyclic)
    segment_index: usize,

    /// Fraction of the current segment covered, `0.0 <= progress < 1.0`
    progress: f64,

    /// Display speed in km/h, derived from the current delay state
    speed_kmh: f64,

    /// Current delay state
    status: BusStatus,

    /// Delay magnitude for the current state, in minutes (non-negative)
    ///
    /// Re-drawn only when the state machine fires; stable between
    /// transitions.
    delay_minutes: f64,

    /// Passenger load in percent, `0 <= occupancy <= 100`
    occupancy: i64,

    /// Interpolated position on the current segment
    position: GeoPoint,

    /// Timestamp of the most recent mutation
    last_updated: SystemTime,
}

impl Bus {
    /// Create a new bus at the start of the given route.
    ///
    /// Position pins to the route's first waypoint, or the origin for an
    /// empty route. Occupancy is clamped to `[0, 100]`.
    pub fn new(id: impl Into<String>, route_index: usize, route: &Route, occupancy: i64) -> Self {
        let position = if route.is_empty() {
            GeoPoint::ORIGIN
        } else {
            route.waypoint(0).position()
        };

        Self {
            id: id.into(),
            route_index,
            segment_index: 0,
            progress: 0.0,
            speed_kmh: BASE_SPEED_KMH,
            status: BusStatus::OnTime,
            delay_minutes: 0.0,
            occupancy: occupancy.clamp(0, MAX_OCCUPANCY),
            position,
            last_updated: SystemTime::now(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn route_index(&self) -> usize {
        self.route_index
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    pub fn status(&self) -> BusStatus {
        self.status
    }

    pub fn delay_minutes(&self) -> f64 {
        self.delay_minutes
    }

    pub fn occupancy(&self) -> i64 {
        self.occupancy
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn last_updated(&self) -> SystemTime {
        self.last_updated
    }

    // ========================================================================
    // Mutators (tick path only)
    // ========================================================================

    /// Place the bus at an explicit point on its route.
    ///
    /// `segment_index` wraps modulo the route length; `progress` is clamped
    /// into `[0.0, 1.0)`. Used when constructing a planned fleet and by
    /// tests; the tick path moves buses via [`apply_advance`](Self::apply_advance).
    pub fn place_at(&mut self, route: &Route, segment_index: usize, progress: f64) {
        if route.len() < 2 {
            self.segment_index = 0;
            self.progress = 0.0;
            if !route.is_empty() {
                self.position = route.waypoint(0).position();
            }
            return;
        }

        let segment_index = segment_index % route.len();
        let progress = if progress.is_finite() && (0.0..1.0).contains(&progress) {
            progress
        } else {
            0.0
        };

        let from = route.waypoint(segment_index).position();
        let to = route.waypoint(segment_index + 1).position();

        self.segment_index = segment_index;
        self.progress = progress;
        self.position = GeoPoint::new(
            from.lat + (to.lat - from.lat) * progress,
            from.lon + (to.lon - from.lon) * progress,
        );
    }

    /// Apply a kinematics step result.
    pub fn apply_advance(&mut self, advance: &Advance) {
        self.segment_index = advance.segment_index;
        self.progress = advance.progress;
        self.position = advance.position;
    }

    /// Adjust occupancy by a delta and clamp to `[0, 100]`.
    pub fn exchange_occupancy(&mut self, delta: i64) {
        self.occupancy = (self.occupancy + delta).clamp(0, MAX_OCCUPANCY);
    }

    /// Enter a delay state with the magnitude drawn for it.
    ///
    /// Also refreshes the display speed, which is a pure function of the
    /// state.
    pub fn set_status(&mut self, status: BusStatus, delay_minutes: f64) {
        self.status = status;
        self.delay_minutes = delay_minutes.max(0.0);
        self.speed_kmh = BASE_SPEED_KMH * crate::delay::speed_factor(status);
    }

    /// Record the time of the most recent mutation.
    pub fn touch(&mut self, at: SystemTime) {
        self.last_updated = at;
    }

    /// Take a value snapshot safe to hand across the read boundary.
    pub fn snapshot(&self, route_id: &str) -> BusSnapshot {
        BusSnapshot {
            bus_id: self.id.clone(),
            route_id: route_id.to_string(),
            lat: self.position.lat,
            lon: self.position.lon,
            speed_kmh: self.speed_kmh,
            status: self.status,
            delay_minutes: self.delay_minutes,
            occupancy: self.occupancy,
            last_updated: epoch_seconds(self.last_updated),
        }
    }
}

/// Point-in-time value copy of one bus, the wire form served to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusSnapshot {
    pub bus_id: String,
    pub route_id: String,
    pub lat: f64,
    pub lon: f64,
    pub speed_kmh: f64,
    pub status: BusStatus,
    pub delay_minutes: f64,
    pub occupancy: i64,
    /// UNIX epoch seconds (UTC) of the last mutation
    pub last_updated: u64,
}

/// Seconds since the UNIX epoch; clamps pre-epoch times to 0.
pub fn epoch_seconds(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}
