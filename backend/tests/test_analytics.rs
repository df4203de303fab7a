//! Tests for the read-side aggregation queries

use std::time::{Duration, UNIX_EPOCH};

use fleet_simulator_core_rs::{
    analytics, Bus, BusPlan, BusStatus, FleetEngine, Route, RouteCatalog, RouteStats,
    RouteStatsTable, SimulationConfig, Waypoint,
};

fn two_route_catalog() -> RouteCatalog {
    RouteCatalog::new(vec![
        Route::new(
            "R-1",
            "Line",
            vec![Waypoint::new(0.0, 0.0, "a"), Waypoint::new(0.0, 1.0, "b")],
        ),
        Route::new(
            "R-2",
            "Spur",
            vec![Waypoint::new(1.0, 0.0, "c"), Waypoint::new(1.0, 1.0, "d")],
        ),
    ])
}

#[test]
fn test_kpis_on_empty_fleet() {
    let catalog = two_route_catalog();
    let stats = RouteStatsTable::new();

    let kpis = analytics::kpis(&[], &catalog, &stats);
    assert_eq!(kpis.active_buses, 0);
    assert_eq!(kpis.total_routes, 2);
    assert_eq!(kpis.delayed_buses, 0);
    assert_eq!(kpis.avg_occupancy, 0.0);
    assert_eq!(kpis.total_revenue, 0.0);
}

#[test]
fn test_kpis_counts_and_means() {
    let catalog = two_route_catalog();
    let mut stats = RouteStatsTable::new();
    stats.set(
        "R-1",
        RouteStats {
            revenue: 100.0,
            reliability: 99.0,
        },
    );
    stats.set(
        "R-2",
        RouteStats {
            revenue: 250.0,
            ..Default::default()
        },
    );

    let route1 = catalog.get("R-1").unwrap().clone();
    let mut buses = vec![
        Bus::new("b1", 0, &route1, 30),
        Bus::new("b2", 0, &route1, 60),
        Bus::new("b3", 1, catalog.get("R-2").unwrap(), 31),
    ];
    buses[1].set_status(BusStatus::MinorDelay, 9.0);
    buses[2].set_status(BusStatus::CriticalDelay, 30.0);

    let kpis = analytics::kpis(&buses, &catalog, &stats);
    assert_eq!(kpis.active_buses, 3);
    assert_eq!(kpis.delayed_buses, 2);
    assert_eq!(kpis.avg_occupancy, 40.3); // (30+60+31)/3 rounded
    assert_eq!(kpis.total_revenue, 350.0);
}

#[test]
fn test_route_analytics_zero_bus_route_keeps_external_stats() {
    let catalog = two_route_catalog();
    let mut stats = RouteStatsTable::new();
    stats.set(
        "R-2",
        RouteStats {
            revenue: 1234.5,
            reliability: 88.8,
        },
    );

    // All buses on R-1; R-2 is empty
    let route1 = catalog.get("R-1").unwrap().clone();
    let buses = vec![Bus::new("b1", 0, &route1, 50)];

    let rows = analytics::route_analytics(&buses, &catalog, &stats);
    assert_eq!(rows.len(), 2);

    let empty = rows.iter().find(|r| r.route_id == "R-2").unwrap();
    assert_eq!(empty.avg_delay, 0.0);
    assert_eq!(empty.avg_occupancy, 0.0);
    assert_eq!(empty.total_passengers, 0);
    assert_eq!(empty.utilization_score, 0.0);
    assert_eq!(empty.revenue, 1234.5);
    assert_eq!(empty.reliability, 88.8);
}

#[test]
fn test_route_analytics_means_and_utilization() {
    let catalog = two_route_catalog();
    let stats = RouteStatsTable::new();

    let route1 = catalog.get("R-1").unwrap().clone();
    let mut buses = vec![
        Bus::new("b1", 0, &route1, 40),
        Bus::new("b2", 0, &route1, 80),
    ];
    buses[0].set_status(BusStatus::MinorDelay, 6.0);
    buses[1].set_status(BusStatus::MinorDelay, 13.0);

    let rows = analytics::route_analytics(&buses, &catalog, &stats);
    let row = rows.iter().find(|r| r.route_id == "R-1").unwrap();

    assert_eq!(row.route_name, "Line");
    assert_eq!(row.avg_delay, 9.5);
    assert_eq!(row.avg_occupancy, 60.0);
    assert_eq!(row.total_passengers, 600);
    assert_eq!(row.utilization_score, 0.6);
    // Defaults for a route with no external entry
    assert_eq!(row.revenue, 0.0);
    assert_eq!(row.reliability, 100.0);
}

#[test]
fn test_utilization_saturates_at_one() {
    let catalog = two_route_catalog();
    let route1 = catalog.get("R-1").unwrap().clone();
    // Occupancy is capped at 100, so utilization caps at exactly 1.0
    let buses = vec![Bus::new("b1", 0, &route1, 100)];

    let rows = analytics::route_analytics(&buses, &catalog, &RouteStatsTable::new());
    assert_eq!(rows[0].utilization_score, 1.0);
}

#[test]
fn test_temporal_patterns_bucket_by_hour() {
    let catalog = two_route_catalog();
    let route1 = catalog.get("R-1").unwrap().clone();

    // Pin update times to controlled UTC hours
    let at_hour = |h: u64| UNIX_EPOCH + Duration::from_secs(h * 3600 + 120);

    let mut buses = vec![
        Bus::new("b1", 0, &route1, 20),
        Bus::new("b2", 0, &route1, 40),
        Bus::new("b3", 0, &route1, 90),
    ];
    buses[0].touch(at_hour(8));
    buses[1].touch(at_hour(8));
    buses[2].touch(at_hour(17));
    buses[0].set_status(BusStatus::MinorDelay, 10.0);

    let buckets = analytics::temporal_patterns(&buses);
    assert_eq!(buckets.len(), 2);

    let eight = &buckets[0];
    assert_eq!(eight.hour, 8);
    assert_eq!(eight.bus_count, 2);
    assert_eq!(eight.avg_occupancy, 30.0);
    assert_eq!(eight.avg_demand, 300.0);
    assert_eq!(eight.avg_delay, 5.0);

    let seventeen = &buckets[1];
    assert_eq!(seventeen.hour, 17);
    assert_eq!(seventeen.bus_count, 1);
    assert_eq!(seventeen.avg_occupancy, 90.0);
}

#[test]
fn test_temporal_patterns_empty_fleet() {
    assert!(analytics::temporal_patterns(&[]).is_empty());
}

#[test]
fn test_engine_queries_are_consistent() {
    let mut config = SimulationConfig::default();
    config.fleet = vec![
        BusPlan {
            occupancy: Some(50),
            ..BusPlan::new("BUS-R-5A-1", "R-5A")
        },
        BusPlan {
            occupancy: Some(70),
            ..BusPlan::new("BUS-R-5A-2", "R-5A")
        },
    ];

    let mut engine = FleetEngine::new(RouteCatalog::fallback(), config).unwrap();
    engine.set_route_stats(
        "R-5A",
        RouteStats {
            revenue: 10.0,
            reliability: 95.0,
        },
    );
    engine.tick(1.0);

    let kpis = engine.kpis();
    assert_eq!(kpis.active_buses, 2);
    assert_eq!(kpis.total_routes, 3);
    assert_eq!(kpis.total_revenue, 10.0);

    // All buses were updated in the same tick: one temporal bucket
    let buckets = engine.temporal_patterns();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].bus_count, 2);
}
