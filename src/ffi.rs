//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that expose the stateless
//! geometry functions to Kotlin and Swift. All FFI functions are prefixed
//! with `ffi_` to avoid naming conflicts with the internal API. The stateful
//! catalog is exported from [`crate::engine::engine_ffi`].

use log::{debug, info};

use crate::{
    init_logging, nearest_on_path, select_best_route_with_config, BestMatch, GeoPoint,
    NearestRouteError, ProjectionResult, Route, SelectionConfig,
};

/// Great-circle distance in meters between two points.
#[uniffi::export]
pub fn ffi_great_circle_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    crate::great_circle_distance(a, b)
}

/// Closest point on a path; `None` for paths with fewer than 2 points.
#[uniffi::export]
pub fn ffi_nearest_on_path(point: GeoPoint, path: Vec<GeoPoint>) -> Option<ProjectionResult> {
    init_logging();
    debug!(
        "[NearestRouteRust] nearest_on_path called with {} points",
        path.len()
    );
    nearest_on_path(&point, &path)
}

/// Select the best route from a JSON array of route documents.
#[uniffi::export]
pub fn ffi_select_best_route(
    destination: GeoPoint,
    routes_json: String,
    config: SelectionConfig,
) -> Result<Option<BestMatch>, NearestRouteError> {
    init_logging();
    config.validate()?;
    let routes: Vec<Route> = serde_json::from_str(&routes_json)?;
    info!(
        "[NearestRouteRust] select_best_route called with {} routes",
        routes.len()
    );

    let start = std::time::Instant::now();
    let best = select_best_route_with_config(&destination, &routes, &config);
    info!(
        "[NearestRouteRust] Selected {:?} in {:?}",
        best.as_ref().map(|b| &b.route_id),
        start.elapsed()
    );
    Ok(best)
}

/// Get default selection config.
#[uniffi::export]
pub fn default_config() -> SelectionConfig {
    init_logging();
    info!("[NearestRouteRust] default_config called - Rust is active!");
    SelectionConfig::default()
}
