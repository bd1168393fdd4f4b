//! End-to-end nearest-route scenarios.
//!
//! Exercises the public API the way the map view does: a catalog of drawn
//! routes, a destination, and the best match with its closest point.
//!
//! Run with: `cargo test --test nearest_route_scenarios`

use nearest_route::geo_utils::polyline_length;
use nearest_route::projection::project_onto_segment;
use nearest_route::{
    great_circle_distance, nearest_on_path, rank_routes, select_best_route, GeoPoint, Route,
    RouteDraft, RouteEngine, SelectionConfig,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small deterministic grid of points around Bogotá.
fn sample_points() -> Vec<GeoPoint> {
    let mut points = Vec::new();
    for i in 0..6 {
        for j in 0..6 {
            points.push(GeoPoint::new(
                4.55 + i as f64 * 0.037,
                -74.15 + j as f64 * 0.041,
            ));
        }
    }
    points.push(GeoPoint::new(-33.45, -70.66));
    points.push(GeoPoint::new(89.9, 179.9));
    points
}

// ============================================================================
// Distance properties
// ============================================================================

#[test]
fn distance_to_self_is_zero_and_distance_is_symmetric() {
    let points = sample_points();
    for a in &points {
        assert_eq!(great_circle_distance(*a, *a), 0.0);
        for b in &points {
            let ab = great_circle_distance(*a, *b);
            let ba = great_circle_distance(*b, *a);
            assert!(ab >= 0.0);
            assert!((ab - ba).abs() < 1e-6, "asymmetric for {:?} {:?}", a, b);
        }
    }
}

#[test]
fn fraction_always_within_unit_interval() {
    let points = sample_points();
    for p in &points {
        for w in points.windows(2) {
            let hit = project_onto_segment(p, &w[0], &w[1]);
            assert!((0.0..=1.0).contains(&hit.fraction));
            assert!(hit.distance_meters >= 0.0);
        }
    }
}

#[test]
fn points_on_short_segments_are_within_a_meter() {
    let a = GeoPoint::new(4.6480, -74.0830);
    let b = GeoPoint::new(4.6620, -74.0610);
    for step in 0..=10 {
        let t = step as f64 / 10.0;
        let on = GeoPoint::new(
            a.latitude + t * (b.latitude - a.latitude),
            a.longitude + t * (b.longitude - a.longitude),
        );
        let hit = project_onto_segment(&on, &a, &b);
        assert!(hit.distance_meters < 1.0, "t={} distance={}", t, hit.distance_meters);
        assert!((hit.fraction - t).abs() < 1e-6);
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_midpoint_projection() {
    let path = vec![GeoPoint::new(4.60, -74.08), GeoPoint::new(4.61, -74.07)];
    let result = nearest_on_path(&GeoPoint::new(4.605, -74.075), &path).unwrap();

    let midpoint = GeoPoint::new(4.605, -74.075);
    assert!(great_circle_distance(result.closest, midpoint) < 5.0);
    assert!(result.distance_meters < 200.0);
    assert_eq!(result.segment_index, 0);
}

fn scenario_b_routes() -> (GeoPoint, Vec<Route>) {
    let destination = GeoPoint::new(4.6760, -74.0480);
    // Parallel to the destination, ~5 km south
    let route_x = Route::new(
        "route-x",
        "Route X",
        vec![
            GeoPoint::new(4.6310, -74.0700),
            GeoPoint::new(4.6310, -74.0480),
            GeoPoint::new(4.6310, -74.0260),
        ],
    );
    // Diagonal passing ~30 m from the destination
    let route_y = Route::new(
        "route-y",
        "Route Y",
        vec![
            GeoPoint::new(4.6600, -74.0640),
            GeoPoint::new(4.6760, -74.0477),
            GeoPoint::new(4.6900, -74.0337),
        ],
    );
    (destination, vec![route_x, route_y])
}

#[test]
fn scenario_b_nearby_route_wins() {
    init_logger();
    let (destination, routes) = scenario_b_routes();

    let best = select_best_route(&destination, &routes).unwrap();
    assert_eq!(best.route_id, "route-y");
    assert!(best.distance_meters() < 50.0);

    let far = nearest_on_path(&destination, &routes[0].path).unwrap();
    assert!((far.distance_meters - 5_000.0).abs() < 100.0);
}

#[test]
fn scenario_c_inactive_route_is_ignored() {
    let (destination, mut routes) = scenario_b_routes();
    routes[1].active = false;

    let best = select_best_route(&destination, &routes).unwrap();
    assert_eq!(best.route_id, "route-x");

    routes[0].active = false;
    assert!(select_best_route(&destination, &routes).is_none());
}

#[test]
fn scenario_d_equidistant_segments_pick_lower_index() {
    let path = vec![
        GeoPoint::new(4.6000, -74.0800),
        GeoPoint::new(4.6000, -74.0700),
        GeoPoint::new(4.6000, -74.0600),
    ];
    // Directly south of the shared vertex: same distance to both segments
    let destination = GeoPoint::new(4.5990, -74.0700);

    let result = nearest_on_path(&destination, &path).unwrap();
    assert_eq!(result.segment_index, 0);

    // Deterministic across calls
    for _ in 0..10 {
        assert_eq!(nearest_on_path(&destination, &path), Some(result));
    }
}

#[test]
fn short_paths_never_match() {
    let destination = GeoPoint::new(4.65, -74.06);
    assert!(nearest_on_path(&destination, &[]).is_none());
    assert!(nearest_on_path(&destination, &[destination]).is_none());

    let routes = vec![
        Route::new("empty", "Empty", vec![]),
        Route::new("single", "Single", vec![destination]),
    ];
    assert!(select_best_route(&destination, &routes).is_none());
    assert!(rank_routes(&destination, &routes, &SelectionConfig::default()).is_empty());
}

// ============================================================================
// Editor to catalog to viewer
// ============================================================================

#[test]
fn drafted_route_is_found_by_the_engine() {
    init_logger();
    let mut draft = RouteDraft::new("Ruta Chapinero");
    draft.company = "SITP".to_string();
    for p in [
        GeoPoint::new(4.6400, -74.0660),
        GeoPoint::new(4.6500, -74.0620),
        GeoPoint::new(4.9999, -74.9999), // misclick
    ] {
        draft.add_point(p);
    }
    assert!(draft.undo_point().is_some());
    draft.add_point(GeoPoint::new(4.6600, -74.0580));

    let route = draft.into_route("chapinero").unwrap();
    assert!(polyline_length(&route.path) > 2_000.0);

    let mut engine = RouteEngine::new();
    let (_, others) = scenario_b_routes();
    engine.set_routes(others);
    engine.add_route(route);

    let destination = GeoPoint::new(4.6502, -74.0615);
    let best = engine.find_best_route(&destination).unwrap();
    assert_eq!(best.route_id, "chapinero");
    assert_eq!(best.route_index, 2);
    assert!(best.rounded_distance() < 100);

    let view = engine.fit_view(&destination).unwrap();
    assert!(view.contains(&destination));
    assert!(view.contains(&best.projection.closest));

    let json = engine.find_best_route_json(&destination);
    assert!(json.contains("\"route_id\":\"chapinero\""));
}
