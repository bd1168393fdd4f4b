//! # Geographic Utilities
//!
//! Core geographic computations shared by the projection engine and the
//! route catalog.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two points |
//! | [`polyline_length`] | Total length of a path in meters |
//! | [`compute_bounds`] | Bounding box of a set of points |
//! | [`compute_center`] | Centroid of a set of points |
//! | [`meters_to_degrees`] | Convert meters to approximate degrees at a latitude |
//!
//! ## Example
//!
//! ```rust
//! use nearest_route::{GeoPoint, geo_utils};
//!
//! let path = vec![
//!     GeoPoint::new(4.6000, -74.0800), // Bogotá
//!     GeoPoint::new(4.6050, -74.0750),
//!     GeoPoint::new(4.6100, -74.0700),
//! ];
//!
//! let length = geo_utils::polyline_length(&path);
//! assert!(length > 1_000.0 && length < 2_000.0);
//! ```
//!
//! All functions expect WGS84 latitude/longitude in degrees.

use geo::{BoundingRect, Coord, LineString};

use crate::{Bounds, GeoPoint};

/// Radius of the sphere used for great-circle distances, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two points using the haversine formula.
///
/// Distance is measured on a sphere of radius [`EARTH_RADIUS_METERS`]; this is
/// the metric reported to callers ("closest stop is 42 m away"). Identical
/// points give 0, antipodal points give half the circumference
/// (≈ 20,015,087 m).
///
/// # Example
///
/// ```rust
/// use nearest_route::{GeoPoint, geo_utils};
///
/// let bogota = GeoPoint::new(4.7110, -74.0721);
/// let medellin = GeoPoint::new(6.2442, -75.5812);
///
/// let distance = geo_utils::haversine_distance(&bogota, &medellin);
/// assert!((distance - 240_000.0).abs() < 5_000.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let half_dlat = ((p2.latitude - p1.latitude).to_radians() / 2.0).sin();
    let half_dlng = ((p2.longitude - p1.longitude).to_radians() / 2.0).sin();

    let h = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlng * half_dlng;
    // Rounding can push h a hair past 1 for antipodal points
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Alias of [`haversine_distance`] taking points by value.
#[inline]
pub fn great_circle_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_distance(&a, &b)
}

/// Total length of a path in meters (sum of haversine segment lengths).
///
/// Empty or single-point paths return 0.0.
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Convert meters to approximate degrees at a given latitude.
///
/// Uses the longitude scale (the smaller one), so the result is a
/// conservative radius for square search areas. Clamped near the poles.
#[inline]
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_rad = latitude.to_radians();
    let meters_per_degree = 111_320.0 * lat_rad.cos().max(0.1);
    meters / meters_per_degree
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a set of points.
///
/// Returns `None` for empty input.
pub fn compute_bounds(points: &[GeoPoint]) -> Option<Bounds> {
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();

    line.bounding_rect().map(|rect| Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

// =============================================================================
// Center/Centroid Functions
// =============================================================================

/// Arithmetic mean of the points' coordinates. Returns (0, 0) for empty input.
///
/// Fine for city-scale paths; not meaningful across the antimeridian.
pub fn compute_center(points: &[GeoPoint]) -> GeoPoint {
    if points.is_empty() {
        return GeoPoint::new(0.0, 0.0);
    }

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    GeoPoint::new(sum_lat / n, sum_lng / n)
}

// =============================================================================
// Unit Tests
// =============================================================================
