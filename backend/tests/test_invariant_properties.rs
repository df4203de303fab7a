//! Property tests for the per-bus invariants
//!
//! Random routes, placements, and rates must never produce a progress
//! outside `[0, 1)`, an occupancy outside `[0, 100]`, or a position off
//! the current segment.

use proptest::prelude::*;

use fleet_simulator_core_rs::{
    delay, kinematics, Bus, DelayConfig, KinematicsConfig, Route, SimRng, Waypoint,
};

fn arb_waypoints() -> impl Strategy<Value = Vec<Waypoint>> {
    prop::collection::vec((-80.0f64..80.0, -179.0f64..179.0), 2..8)
        .prop_map(|points| {
            points
                .into_iter()
                .map(|(lat, lon)| Waypoint::new(lat, lon, "stop"))
                .collect()
        })
}

proptest! {
    #[test]
    fn prop_advance_preserves_invariants(
        waypoints in arb_waypoints(),
        start_segment in 0usize..8,
        start_progress in 0.0f64..1.0,
        elapsed in 0.0f64..10.0,
        factor in 0.0f64..1.0,
        rate in 1e-6f64..0.5,
    ) {
        let route = Route::new("R-p", "Prop", waypoints);
        let config = KinematicsConfig {
            base_rate_deg_per_sec: rate,
            ..Default::default()
        };

        let adv = kinematics::advance(
            &route,
            start_segment % route.len(),
            start_progress,
            elapsed,
            factor,
            &config,
        );

        prop_assert!((0.0..1.0).contains(&adv.progress));
        prop_assert!(adv.segment_index < route.len());

        let from = route.waypoint(adv.segment_index).position();
        let to = route.waypoint(adv.segment_index + 1).position();
        prop_assert!(adv.position.lat >= from.lat.min(to.lat) - 1e-9);
        prop_assert!(adv.position.lat <= from.lat.max(to.lat) + 1e-9);
        prop_assert!(adv.position.lon >= from.lon.min(to.lon) - 1e-9);
        prop_assert!(adv.position.lon <= from.lon.max(to.lon) + 1e-9);
    }

    #[test]
    fn prop_occupancy_stays_clamped(
        initial in -50i64..150,
        deltas in prop::collection::vec(-30i64..30, 0..50),
    ) {
        let route = Route::new(
            "R-o",
            "Clamp",
            vec![Waypoint::new(0.0, 0.0, "a"), Waypoint::new(0.0, 1.0, "b")],
        );
        let mut bus = Bus::new("b", 0, &route, initial);

        prop_assert!((0..=100).contains(&bus.occupancy()));
        for delta in deltas {
            bus.exchange_occupancy(delta);
            prop_assert!((0..=100).contains(&bus.occupancy()));
        }
    }

    #[test]
    fn prop_transitions_respect_bands(seed in any::<u64>()) {
        let config = DelayConfig {
            transition_probability: 1.0,
            ..Default::default()
        };
        let mut rng = SimRng::new(seed);

        for _ in 0..100 {
            let (status, minutes) =
                delay::maybe_transition(&config, &mut rng).expect("p=1 always fires");
            prop_assert!(config.band(status).contains(minutes));
        }
    }
}
