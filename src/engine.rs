//! # Route Engine
//!
//! Stateful route catalog that keeps the current route snapshot in Rust.
//!
//! ## Architecture
//!
//! The engine holds:
//! - Routes in catalog order (order decides ties between equidistant routes)
//! - The selection configuration
//! - An R-tree over route bounding boxes for viewport queries
//!
//! The data-access layer pushes snapshots in (route by route or as a JSON
//! document); the map view asks for the best route to a destination and for
//! the routes to draw in the current viewport. Nearest-route queries always
//! scan the whole snapshot; the R-tree only serves viewport and nearby
//! lookups.

use std::sync::Mutex;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rstar::{RTree, RTreeObject, AABB};
use serde::Serialize;

use crate::geo_utils::{compute_center, meters_to_degrees};
use crate::selection::{rank_routes, select_best_route_with_config};
use crate::{
    BestMatch, Bounds, GeoPoint, NearestRouteError, OptionExt, Result, Route, SelectionConfig,
    MIN_PATH_POINTS,
};

/// Catalogs at least this large use the rayon selection path.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 256;

// ============================================================================
// Core Types
// ============================================================================

/// Bounds wrapper for R-tree spatial indexing
#[derive(Debug, Clone)]
pub struct RouteBounds {
    pub route_id: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl RTreeObject for RouteBounds {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}

/// Route bounds info for map display
#[derive(Debug, Clone, Serialize)]
pub struct RouteBoundsInfo {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub bounds: [[f64; 2]; 2], // [[minLat, minLng], [maxLat, maxLng]]
    pub center: GeoPoint,
    pub distance: f64, // meters along the path
}

// ============================================================================
// Route Engine
// ============================================================================

/// The route catalog and query engine.
pub struct RouteEngine {
    // Snapshot in catalog order, ids unique
    routes: Vec<Route>,

    // Spatial index for viewport queries
    spatial_index: RTree<RouteBounds>,
    spatial_dirty: bool,

    // Configuration
    config: SelectionConfig,
}

impl RouteEngine {
    /// Create a new engine with default configuration.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            spatial_index: RTree::new(),
            spatial_dirty: false,
            config: SelectionConfig::default(),
        }
    }

    /// Create a new engine with custom configuration.
    pub fn with_config(config: SelectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    // ========================================================================
    // Route Management
    // ========================================================================

    /// Add a route, or replace the route with the same id in place.
    ///
    /// Replacing keeps the route's catalog position, so tie-breaking does not
    /// change when a route is edited.
    pub fn add_route(&mut self, route: Route) {
        match self.routes.iter_mut().find(|r| r.id == route.id) {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
        self.spatial_dirty = true;
    }

    /// Add several routes in order.
    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = Route>) {
        for route in routes {
            self.add_route(route);
        }
    }

    /// Replace the whole snapshot.
    pub fn set_routes(&mut self, routes: Vec<Route>) {
        self.routes.clear();
        self.spatial_dirty = true;
        self.add_routes(routes);
        info!("[RouteEngine] Snapshot replaced: {} routes", self.routes.len());
    }

    /// Replace the snapshot from a JSON array of route documents.
    ///
    /// Returns the number of routes loaded. On a parse error the current
    /// snapshot is left untouched.
    pub fn load_json(&mut self, json: &str) -> Result<usize> {
        let routes: Vec<Route> = serde_json::from_str(json)?;
        for route in &routes {
            if route.id.trim().is_empty() {
                return Err(NearestRouteError::Catalog {
                    message: "route document without id".to_string(),
                });
            }
            if route.active && route.path.len() < MIN_PATH_POINTS {
                warn!(
                    "[RouteEngine] Active route {} has {} points and will never match",
                    route.id,
                    route.path.len()
                );
            }
        }
        self.set_routes(routes);
        Ok(self.routes.len())
    }

    /// Remove a route by id.
    pub fn remove_route(&mut self, id: &str) -> Result<Route> {
        let pos = self.routes.iter().position(|r| r.id == id).ok_or_not_found(id)?;
        self.spatial_dirty = true;
        Ok(self.routes.remove(pos))
    }

    /// Activate or deactivate a route.
    pub fn set_active(&mut self, id: &str, active: bool) -> Result<()> {
        let route = self.routes.iter_mut().find(|r| r.id == id).ok_or_not_found(id)?;
        route.active = active;
        debug!("[RouteEngine] Route {} active={}", id, active);
        Ok(())
    }

    /// Clear all routes.
    pub fn clear(&mut self) {
        self.routes.clear();
        self.spatial_index = RTree::new();
        self.spatial_dirty = false;
    }

    pub fn route(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Routes serialized as a JSON array of route documents.
    pub fn routes_json(&self) -> String {
        serde_json::to_string(&self.routes).unwrap_or_else(|_| "[]".to_string())
    }

    // ========================================================================
    // Nearest Route
    // ========================================================================

    /// The route passing closest to `destination`, if any is eligible.
    pub fn find_best_route(&self, destination: &GeoPoint) -> Option<BestMatch> {
        #[cfg(feature = "parallel")]
        {
            if self.routes.len() >= PARALLEL_THRESHOLD {
                return crate::selection::select_best_route_parallel(
                    destination,
                    &self.routes,
                    &self.config,
                );
            }
        }

        select_best_route_with_config(destination, &self.routes, &self.config)
    }

    /// All eligible routes' matches, closest first.
    pub fn rank_routes(&self, destination: &GeoPoint) -> Vec<BestMatch> {
        rank_routes(destination, &self.routes, &self.config)
    }

    /// Best match as JSON, `null` when nothing matches.
    pub fn find_best_route_json(&self, destination: &GeoPoint) -> String {
        serde_json::to_string(&self.find_best_route(destination))
            .unwrap_or_else(|_| "null".to_string())
    }

    /// Bounds framing the destination and the best route's path.
    pub fn fit_view(&self, destination: &GeoPoint) -> Option<Bounds> {
        let best = self.find_best_route(destination)?;
        let route = self.routes.get(best.route_index as usize)?;
        Some(best.view_bounds(destination, &route.path))
    }

    // ========================================================================
    // Spatial Queries
    // ========================================================================

    /// Ensure spatial index is built.
    fn ensure_spatial_index(&mut self) {
        if !self.spatial_dirty {
            return;
        }

        // Same rule as map drawing: every route with a drawable path
        let bounds: Vec<RouteBounds> = self
            .routes
            .iter()
            .filter(|r| r.path.len() >= MIN_PATH_POINTS)
            .filter_map(|r| {
                r.bounds().map(|b| RouteBounds {
                    route_id: r.id.clone(),
                    min_lat: b.min_lat,
                    max_lat: b.max_lat,
                    min_lng: b.min_lng,
                    max_lng: b.max_lng,
                })
            })
            .collect();

        self.spatial_index = RTree::bulk_load(bounds);
        self.spatial_dirty = false;
    }

    /// Ids of routes whose bounds intersect a viewport, in catalog order.
    pub fn query_viewport(&mut self, bounds: &Bounds) -> Vec<String> {
        self.ensure_spatial_index();

        let search_bounds = AABB::from_corners(
            [bounds.min_lng, bounds.min_lat],
            [bounds.max_lng, bounds.max_lat],
        );

        let hits: Vec<&str> = self
            .spatial_index
            .locate_in_envelope_intersecting(&search_bounds)
            .map(|b| b.route_id.as_str())
            .collect();

        self.routes
            .iter()
            .filter(|r| hits.contains(&r.id.as_str()))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Query routes within a viewport (raw coordinates).
    pub fn query_viewport_raw(
        &mut self,
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> Vec<String> {
        self.query_viewport(&Bounds {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Routes whose bounds come within `radius_meters` of a point.
    ///
    /// This is a bounding-box prefilter, not an exact distance test.
    pub fn find_nearby(&mut self, lat: f64, lng: f64, radius_meters: f64) -> Vec<String> {
        let radius_degrees = meters_to_degrees(radius_meters, lat);
        self.query_viewport_raw(
            lat - radius_degrees,
            lat + radius_degrees,
            lng - radius_degrees,
            lng + radius_degrees,
        )
    }

    /// Bounds info for every drawable route, for map display.
    pub fn get_all_route_bounds_info(&self) -> Vec<RouteBoundsInfo> {
        self.routes
            .iter()
            .filter(|r| r.path.len() >= MIN_PATH_POINTS)
            .filter_map(|r| {
                let b = r.bounds()?;
                Some(RouteBoundsInfo {
                    id: r.id.clone(),
                    name: r.name.clone(),
                    active: r.active,
                    bounds: [[b.min_lat, b.min_lng], [b.max_lat, b.max_lng]],
                    center: compute_center(&r.path),
                    distance: r.length_meters(),
                })
            })
            .collect()
    }

    pub fn get_all_route_bounds_json(&self) -> String {
        serde_json::to_string(&self.get_all_route_bounds_info())
            .unwrap_or_else(|_| "[]".to_string())
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Set selection configuration.
    pub fn set_config(&mut self, config: SelectionConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Get engine statistics.
    pub fn stats(&mut self) -> EngineStats {
        self.ensure_spatial_index();

        EngineStats {
            route_count: self.routes.len() as u32,
            active_count: self.routes.iter().filter(|r| r.active).count() as u32,
            eligible_count: self.routes.iter().filter(|r| r.is_eligible()).count() as u32,
            indexed_count: self.spatial_index.size() as u32,
        }
    }
}

impl Default for RouteEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine statistics for monitoring.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct EngineStats {
    pub route_count: u32,
    pub active_count: u32,
    pub eligible_count: u32,
    pub indexed_count: u32,
}

// ============================================================================
// Global Singleton
// ============================================================================

/// Global engine instance.
///
/// This singleton allows FFI calls to access a shared engine without
/// passing state back and forth across the FFI boundary.
pub static ENGINE: Lazy<Mutex<RouteEngine>> = Lazy::new(|| Mutex::new(RouteEngine::new()));

/// Get a lock on the global engine.
pub fn with_engine<F, R>(f: F) -> R
where
    F: FnOnce(&mut RouteEngine) -> R,
{
    // Queries cannot leave the engine half-updated, so a poisoned lock is still usable
    let mut engine = ENGINE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut engine)
}

// ============================================================================
// FFI Exports
// ============================================================================

#[cfg(feature = "ffi")]
pub mod engine_ffi {
    use super::*;
    use log::info;

    /// Initialize the engine (call once at app startup).
    #[uniffi::export]
    pub fn engine_init() {
        crate::init_logging();
        info!("[RouteEngine] Initialized");
    }

    /// Clear all engine state.
    #[uniffi::export]
    pub fn engine_clear() {
        with_engine(|e| e.clear());
        info!("[RouteEngine] Cleared");
    }

    /// Replace the route snapshot from a JSON array of route documents.
    #[uniffi::export]
    pub fn engine_load_routes_json(json: String) -> std::result::Result<u32, NearestRouteError> {
        let count = with_engine(|e| e.load_json(&json))?;
        info!("[RouteEngine] Loaded {} routes", count);
        Ok(count as u32)
    }

    /// Remove a route.
    #[uniffi::export]
    pub fn engine_remove_route(route_id: String) -> std::result::Result<(), NearestRouteError> {
        with_engine(|e| e.remove_route(&route_id)).map(|_| ())
    }

    /// Activate or deactivate a route.
    #[uniffi::export]
    pub fn engine_set_active(
        route_id: String,
        active: bool,
    ) -> std::result::Result<(), NearestRouteError> {
        with_engine(|e| e.set_active(&route_id, active))
    }

    /// Get route count.
    #[uniffi::export]
    pub fn engine_get_route_count() -> u32 {
        with_engine(|e| e.route_count() as u32)
    }

    /// Route closest to a destination.
    #[uniffi::export]
    pub fn engine_find_best_route(lat: f64, lng: f64) -> Option<BestMatch> {
        with_engine(|e| e.find_best_route(&GeoPoint::new(lat, lng)))
    }

    /// Every eligible route, closest first.
    #[uniffi::export]
    pub fn engine_rank_routes(lat: f64, lng: f64) -> Vec<BestMatch> {
        with_engine(|e| e.rank_routes(&GeoPoint::new(lat, lng)))
    }

    /// Bounds framing the destination and its best route.
    #[uniffi::export]
    pub fn engine_fit_view(lat: f64, lng: f64) -> Option<Bounds> {
        with_engine(|e| e.fit_view(&GeoPoint::new(lat, lng)))
    }

    /// Query routes in viewport.
    #[uniffi::export]
    pub fn engine_query_viewport(
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> Vec<String> {
        with_engine(|e| e.query_viewport_raw(min_lat, max_lat, min_lng, max_lng))
    }

    /// Find routes near a point.
    #[uniffi::export]
    pub fn engine_find_nearby(lat: f64, lng: f64, radius_meters: f64) -> Vec<String> {
        with_engine(|e| e.find_nearby(lat, lng, radius_meters))
    }

    /// Get all route bounds info as JSON for map display.
    /// Returns: [{"id": "...", "name": "...", "active": true, "bounds": [[minLat, minLng], [maxLat, maxLng]], "center": {"lat": .., "lng": ..}, "distance": ...}, ...]
    #[uniffi::export]
    pub fn engine_get_all_route_bounds_json() -> String {
        with_engine(|e| e.get_all_route_bounds_json())
    }

    /// Set selection configuration.
    #[uniffi::export]
    pub fn engine_set_config(
        config: crate::SelectionConfig,
    ) -> std::result::Result<(), NearestRouteError> {
        with_engine(|e| e.set_config(config))
    }

    /// Get engine statistics.
    #[uniffi::export]
    pub fn engine_get_stats() -> EngineStats {
        with_engine(|e| e.stats())
    }
}

// ============================================================================
// Tests
// ============================================================================
