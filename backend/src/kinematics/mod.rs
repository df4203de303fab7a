//! Kinematics - pure movement math along a route polyline
//!
//! Distances are planar lat/lon deltas, not geodesic; at city scale the
//! error is irrelevant for a dashboard display. The base rate is calibrated
//! so default speeds look plausible on real-world coordinate deltas
//! (1 degree ~ 111 km, so 1e-4 deg/s ~ 40 km/h).
//!
//! [`advance`] is a pure function over `(segment_index, progress)`; the
//! caller owns the bus and applies the result. The only side channel is
//! `arrived_at_stop`, which tells the caller to run the passenger exchange.

use serde::{Deserialize, Serialize};

use crate::models::route::{GeoPoint, Route};

/// Nominal cruising speed implied by the default base rate, in km/h.
///
/// The display speed of a bus is this value scaled by the delay state's
/// speed factor.
pub const BASE_SPEED_KMH: f64 = 40.0;

/// Movement calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    /// Distance covered per second at full speed, in coordinate degrees.
    pub base_rate_deg_per_sec: f64,

    /// Substitute distance for numerically zero segments (duplicate
    /// waypoints in a feed), in coordinate degrees.
    pub min_segment_distance: f64,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            base_rate_deg_per_sec: 1e-4,
            min_segment_distance: 0.001,
        }
    }
}

/// Result of one movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    pub segment_index: usize,
    /// Always in `[0.0, 1.0)`.
    pub progress: f64,
    /// Convex combination of the waypoints bounding `segment_index`.
    pub position: GeoPoint,
    /// The step crossed a waypoint; the caller should run the passenger
    /// exchange.
    pub arrived_at_stop: bool,
}

/// Planar distance between two points, in coordinate degrees.
pub fn planar_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = b.lat - a.lat;
    let dlon = b.lon - a.lon;
    (dlat * dlat + dlon * dlon).sqrt()
}

/// Advance a position along a route polyline.
///
/// Steps `progress` by `base_rate * elapsed_seconds * speed_factor / d`
/// where `d` is the current segment's planar length. On reaching 1.0 the
/// progress resets to 0 (overshoot carry is deliberately discarded) and
/// the segment index advances cyclically.
///
/// Routes with fewer than two waypoints pin the position: the single
/// waypoint if there is one, the origin otherwise. No movement occurs and
/// the incoming `segment_index`/`progress` pass through unchanged.
pub fn advance(
    route: &Route,
    segment_index: usize,
    progress: f64,
    elapsed_seconds: f64,
    speed_factor: f64,
    config: &KinematicsConfig,
) -> Advance {
    if route.len() < 2 {
        let position = if route.is_empty() {
            GeoPoint::ORIGIN
        } else {
            route.waypoint(0).position()
        };
        return Advance {
            segment_index,
            progress,
            position,
            arrived_at_stop: false,
        };
    }

    let mut segment_index = segment_index % route.len();
    let from = route.waypoint(segment_index).position();
    let to = route.waypoint(segment_index + 1).position();

    let mut distance = planar_distance(from, to);
    if distance == 0.0 {
        distance = config.min_segment_distance;
    }

    let step = (config.base_rate_deg_per_sec * elapsed_seconds * speed_factor) / distance;
    let mut progress = progress + step;

    let arrived_at_stop = progress >= 1.0;
    if arrived_at_stop {
        progress = 0.0;
        segment_index = (segment_index + 1) % route.len();
    }

    // Interpolate on the (possibly just-advanced) segment
    let from = route.waypoint(segment_index).position();
    let to = route.waypoint(segment_index + 1).position();
    let position = GeoPoint::new(
        from.lat + (to.lat - from.lat) * progress,
        from.lon + (to.lon - from.lon) * progress,
    );

    Advance {
        segment_index,
        progress,
        position,
        arrived_at_stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::Waypoint;

    fn straight_route() -> Route {
        Route::new(
            "R-1",
            "Line",
            vec![Waypoint::new(0.0, 0.0, "a"), Waypoint::new(0.0, 1.0, "b")],
        )
    }

    #[test]
    fn test_quarter_step() {
        // Segment length 1.0, rate chosen so one 1s tick covers 25%
        let config = KinematicsConfig {
            base_rate_deg_per_sec: 0.25,
            ..Default::default()
        };
        let route = straight_route();

        let adv = advance(&route, 0, 0.0, 1.0, 1.0, &config);
        assert_eq!(adv.segment_index, 0);
        assert!((adv.progress - 0.25).abs() < 1e-12);
        assert_eq!(adv.position, GeoPoint::new(0.0, 0.25));
        assert!(!adv.arrived_at_stop);
    }

    #[test]
    fn test_speed_factor_scales_step() {
        let config = KinematicsConfig {
            base_rate_deg_per_sec: 0.25,
            ..Default::default()
        };
        let route = straight_route();

        let adv = advance(&route, 0, 0.0, 1.0, 0.2, &config);
        assert!((adv.progress - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_segment_advance_resets_progress() {
        let config = KinematicsConfig {
            base_rate_deg_per_sec: 0.6,
            ..Default::default()
        };
        let route = straight_route();

        let adv = advance(&route, 0, 0.0, 1.0, 1.0, &config);
        assert_eq!(adv.segment_index, 0);
        assert!((adv.progress - 0.6).abs() < 1e-12);

        // 0.6 + 0.6 crosses the waypoint: progress resets, overshoot dropped
        let adv = advance(&route, adv.segment_index, adv.progress, 1.0, 1.0, &config);
        assert!(adv.arrived_at_stop);
        assert_eq!(adv.segment_index, 1);
        assert_eq!(adv.progress, 0.0);
        assert_eq!(adv.position, GeoPoint::new(0.0, 1.0));
    }

    #[test]
    fn test_segment_advance_wraps_cyclically() {
        let config = KinematicsConfig {
            base_rate_deg_per_sec: 2.0,
            ..Default::default()
        };
        let route = straight_route();

        // Departing the last waypoint wraps back to segment 0
        let adv = advance(&route, 1, 0.9, 1.0, 1.0, &config);
        assert!(adv.arrived_at_stop);
        assert_eq!(adv.segment_index, 0);
        assert_eq!(adv.position, GeoPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_zero_length_segment_uses_epsilon() {
        let route = Route::new(
            "R-dup",
            "Duplicate stop",
            vec![Waypoint::new(5.0, 5.0, "a"), Waypoint::new(5.0, 5.0, "b")],
        );
        let config = KinematicsConfig::default();

        // No division by zero; the tiny substitute distance makes the bus
        // hop the degenerate segment quickly
        let adv = advance(&route, 0, 0.99, 1.0, 1.0, &config);
        assert!(adv.progress.is_finite());
        assert_eq!(adv.position, GeoPoint::new(5.0, 5.0));
    }

    #[test]
    fn test_single_waypoint_pins_position() {
        let route = Route::new("R-pin", "Pin", vec![Waypoint::new(3.0, 4.0, "only")]);
        let config = KinematicsConfig::default();

        let adv = advance(&route, 0, 0.4, 1.0, 1.0, &config);
        assert_eq!(adv.position, GeoPoint::new(3.0, 4.0));
        assert_eq!(adv.progress, 0.4);
        assert!(!adv.arrived_at_stop);
    }

    #[test]
    fn test_empty_route_pins_to_origin() {
        let route = Route::new("R-empty", "Empty", vec![]);
        let config = KinematicsConfig::default();

        let adv = advance(&route, 0, 0.0, 1.0, 1.0, &config);
        assert_eq!(adv.position, GeoPoint::ORIGIN);
    }

    #[test]
    fn test_traversal_tick_count_is_deterministic() {
        // d = 1.0, step = 0.3 per tick: arrival on tick ceil(1/0.3) = 4
        let config = KinematicsConfig {
            base_rate_deg_per_sec: 0.3,
            ..Default::default()
        };
        let route = straight_route();

        let mut segment = 0;
        let mut progress = 0.0;
        let mut ticks = 0;
        loop {
            let adv = advance(&route, segment, progress, 1.0, 1.0, &config);
            segment = adv.segment_index;
            progress = adv.progress;
            ticks += 1;
            if adv.arrived_at_stop {
                break;
            }
        }

        assert_eq!(ticks, 4);
        assert_eq!(segment, 1);
    }

    #[test]
    fn test_position_stays_on_segment() {
        let route = Route::new(
            "R-2",
            "Diagonal",
            vec![
                Waypoint::new(16.50, 80.60, "a"),
                Waypoint::new(16.52, 80.64, "b"),
                Waypoint::new(16.55, 80.61, "c"),
            ],
        );
        let config = KinematicsConfig {
            base_rate_deg_per_sec: 0.005,
            ..Default::default()
        };

        let mut segment = 0;
        let mut progress = 0.0;
        for _ in 0..200 {
            let adv = advance(&route, segment, progress, 1.0, 1.0, &config);
            let from = route.waypoint(adv.segment_index).position();
            let to = route.waypoint(adv.segment_index + 1).position();

            let (lat_lo, lat_hi) = (from.lat.min(to.lat), from.lat.max(to.lat));
            let (lon_lo, lon_hi) = (from.lon.min(to.lon), from.lon.max(to.lon));
            assert!(adv.position.lat >= lat_lo && adv.position.lat <= lat_hi);
            assert!(adv.position.lon >= lon_lo && adv.position.lon <= lon_hi);
            assert!((0.0..1.0).contains(&adv.progress));

            segment = adv.segment_index;
            progress = adv.progress;
        }
    }
}
