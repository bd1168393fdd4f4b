//! # Nearest Route
//!
//! Finds which transit route passes closest to a rider's destination, and the
//! exact closest point along it.
//!
//! This library provides:
//! - Great-circle (haversine) distances between coordinates
//! - Closest point on a segment and on a multi-segment path
//! - Best-route selection among a catalog of active routes
//! - A route catalog with spatial viewport queries
//!
//! ## Features
//!
//! - **`parallel`** - Parallel route selection with rayon
//! - **`ffi`** - FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use nearest_route::{select_best_route, GeoPoint, Route};
//!
//! let routes = vec![
//!     Route::new(
//!         "ruta-1",
//!         "Calle 26",
//!         vec![GeoPoint::new(4.60, -74.08), GeoPoint::new(4.61, -74.07)],
//!     ),
//!     Route::new(
//!         "ruta-2",
//!         "Autopista Norte",
//!         vec![GeoPoint::new(4.70, -74.05), GeoPoint::new(4.75, -74.04)],
//!     ),
//! ];
//!
//! let destination = GeoPoint::new(4.605, -74.075);
//! if let Some(best) = select_best_route(&destination, &routes) {
//!     println!(
//!         "Take {} and get off {} m from your destination",
//!         best.route_id,
//!         best.rounded_distance()
//!     );
//! }
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{NearestRouteError, OptionExt, Result};

// Geographic utilities (distance, bounds, center calculations)
pub mod geo_utils;
pub use geo_utils::{great_circle_distance, haversine_distance};

// Closest point on segments and paths (local planar approximation)
pub mod projection;
pub use projection::{nearest_on_path, project_onto_segment, SegmentProjection};

// Best-route selection among candidates
pub mod selection;
#[cfg(feature = "parallel")]
pub use selection::select_best_route_parallel;
pub use selection::{rank_routes, select_best_route, select_best_route_with_config};

// Route drafts built by the route editor
pub mod draft;
pub use draft::RouteDraft;

// Stateful route catalog (singleton with the current route snapshot)
pub mod engine;
pub use engine::{with_engine, EngineStats, RouteEngine, ENGINE};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("NearestRouteRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

/// Minimum number of points for a path to have a segment.
pub const MIN_PATH_POINTS: usize = 2;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate in degrees.
///
/// Serialized as `{"lat": .., "lng": ..}`, the shape route documents are
/// stored in.
///
/// # Example
/// ```
/// use nearest_route::GeoPoint;
/// let point = GeoPoint::new(4.6097, -74.0817); // Bogotá
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeoPoint {
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lng", alias = "longitude")]
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has finite, in-range coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points. `None` for empty input.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        geo_utils::compute_bounds(points)
    }

    /// Grow the bounds to include a point.
    pub fn include(&mut self, point: &GeoPoint) {
        self.min_lat = self.min_lat.min(point.latitude);
        self.max_lat = self.max_lat.max(point.latitude);
        self.min_lng = self.min_lng.min(point.longitude);
        self.max_lng = self.max_lng.max(point.longitude);
    }

    /// Check if a point lies inside (edges included).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// A transit route as stored in the route catalog.
///
/// Only `active` routes whose path has at least 2 points take part in
/// nearest-route queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    /// Drawn polyline; point i connects to point i + 1
    #[serde(default)]
    pub path: Vec<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl Route {
    /// Create an active route with no address or company metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: Vec<GeoPoint>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: true,
            path,
            origin_address: None,
            destination_address: None,
            company: None,
        }
    }

    /// Builder-style setter for the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Whether this route takes part in nearest-route queries.
    pub fn is_eligible(&self) -> bool {
        self.active && self.path.len() >= MIN_PATH_POINTS
    }

    /// Validate the route for saving: enough points, all coordinates valid.
    pub fn validate(&self) -> Result<()> {
        if self.path.len() < MIN_PATH_POINTS {
            return Err(NearestRouteError::InsufficientPoints {
                route_id: self.id.clone(),
                point_count: self.path.len(),
                minimum_required: MIN_PATH_POINTS,
            });
        }
        if let Some((i, p)) = self.path.iter().enumerate().find(|(_, p)| !p.is_valid()) {
            return Err(NearestRouteError::InvalidCoordinates {
                route_id: self.id.clone(),
                message: format!("point {} ({}, {}) out of range", i, p.latitude, p.longitude),
            });
        }
        Ok(())
    }

    /// Path length in meters (haversine).
    pub fn length_meters(&self) -> f64 {
        geo_utils::polyline_length(&self.path)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.path)
    }
}

/// Closest point on a path to a query point.
///
/// `distance_meters` is the planar (equirectangular) distance; see
/// [`projection`] for the precision tradeoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ProjectionResult {
    /// Closest point on the path
    pub closest: GeoPoint,
    /// Distance from the query point to `closest`, in meters
    pub distance_meters: f64,
    /// Index of the segment containing `closest` (segment i joins points i and i + 1)
    pub segment_index: u32,
}

/// The route passing closest to a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct BestMatch {
    /// ID of the selected route
    pub route_id: String,
    /// Position of the selected route in the input sequence
    pub route_index: u32,
    /// Closest point on the selected route
    pub projection: ProjectionResult,
}

impl BestMatch {
    /// Distance to the route in meters.
    pub fn distance_meters(&self) -> f64 {
        self.projection.distance_meters
    }

    /// Distance rounded to whole meters, as shown in map labels.
    pub fn rounded_distance(&self) -> u64 {
        self.projection.distance_meters.round() as u64
    }

    /// Bounds that frame the destination together with the matched path.
    pub fn view_bounds(&self, destination: &GeoPoint, path: &[GeoPoint]) -> Bounds {
        let mut bounds = Bounds {
            min_lat: destination.latitude,
            max_lat: destination.latitude,
            min_lng: destination.longitude,
            max_lng: destination.longitude,
        };
        for p in path {
            bounds.include(p);
        }
        bounds
    }
}

/// Configuration for best-route selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SelectionConfig {
    /// Matches farther than this many meters are discarded.
    /// Default: None (no limit)
    pub max_distance_meters: Option<f64>,

    /// Treat inactive routes as eligible (admin preview of drafts).
    /// Default: false
    pub include_inactive: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_distance_meters: None,
            include_inactive: false,
        }
    }
}

impl SelectionConfig {
    /// Reject limits that can never match anything.
    pub fn validate(&self) -> Result<()> {
        match self.max_distance_meters {
            Some(limit) if !(limit.is_finite() && limit >= 0.0) => {
                Err(NearestRouteError::Config {
                    message: format!("max_distance_meters must be finite and >= 0, got {}", limit),
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether a route takes part in selection under this config.
    pub fn is_eligible(&self, route: &Route) -> bool {
        (self.include_inactive || route.active) && route.path.len() >= MIN_PATH_POINTS
    }
}

// ============================================================================
// Tests
// ============================================================================
