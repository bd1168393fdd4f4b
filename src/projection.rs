//! Closest point on a segment and on a path.
//!
//! True geodesic projection onto a segment has no closed form, so points are
//! flattened into a local equirectangular frame centered on each segment's
//! mean latitude and projected there. Distances returned by this module are
//! **planar meters in that frame**, not haversine distances. For city-scale
//! transit segments (a few hundred meters to a few km, away from the poles)
//! the difference is negligible; long or high-latitude segments would need a
//! true geodesic projection.

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, ProjectionResult, MIN_PATH_POINTS};

/// Meters per degree of latitude in the local frame.
pub const METERS_PER_DEGREE_LAT: f64 = 111_132.0;

/// Meters per degree of longitude at the equator in the local frame.
pub const METERS_PER_DEGREE_LNG: f64 = 111_320.0;

/// Floor for a segment's squared length (m²). Zero-length segments from
/// duplicate consecutive points project onto their start.
pub const MIN_SEGMENT_LENGTH_SQ: f64 = 1e-9;

/// Closest point on one segment to a query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentProjection {
    /// Closest point on the segment
    pub closest: GeoPoint,
    /// Position along the segment, 0 = start, 1 = end (always clamped)
    pub fraction: f64,
    /// Planar distance from the query point to `closest`, in meters
    pub distance_meters: f64,
}

/// Equirectangular frame around a reference latitude.
#[derive(Debug, Clone, Copy)]
struct LocalFrame {
    meters_per_degree_lng: f64,
}

impl LocalFrame {
    fn new(reference_lat: f64) -> Self {
        Self {
            meters_per_degree_lng: METERS_PER_DEGREE_LNG * reference_lat.to_radians().cos(),
        }
    }

    fn to_xy(&self, p: &GeoPoint) -> (f64, f64) {
        (
            p.longitude * self.meters_per_degree_lng,
            p.latitude * METERS_PER_DEGREE_LAT,
        )
    }

    fn to_geo(&self, x: f64, y: f64) -> GeoPoint {
        GeoPoint::new(y / METERS_PER_DEGREE_LAT, x / self.meters_per_degree_lng)
    }
}

/// Find the closest point to `point` on the segment `start → end`.
///
/// # Example
/// ```
/// use nearest_route::{GeoPoint, projection::project_onto_segment};
///
/// let a = GeoPoint::new(4.60, -74.08);
/// let b = GeoPoint::new(4.61, -74.07);
/// let hit = project_onto_segment(&GeoPoint::new(4.605, -74.075), &a, &b);
/// assert!((hit.fraction - 0.5).abs() < 0.01);
/// ```
pub fn project_onto_segment(point: &GeoPoint, start: &GeoPoint, end: &GeoPoint) -> SegmentProjection {
    let frame = LocalFrame::new((start.latitude + end.latitude) / 2.0);
    let (px, py) = frame.to_xy(point);
    let (ax, ay) = frame.to_xy(start);
    let (bx, by) = frame.to_xy(end);

    let ab_x = bx - ax;
    let ab_y = by - ay;
    let ap_x = px - ax;
    let ap_y = py - ay;

    let ab_len_sq = (ab_x * ab_x + ab_y * ab_y).max(MIN_SEGMENT_LENGTH_SQ);
    let fraction = ((ap_x * ab_x + ap_y * ab_y) / ab_len_sq).clamp(0.0, 1.0);

    let cx = ax + ab_x * fraction;
    let cy = ay + ab_y * fraction;

    SegmentProjection {
        closest: frame.to_geo(cx, cy),
        fraction,
        distance_meters: (px - cx).hypot(py - cy),
    }
}

/// Find the closest point to `point` along a path.
///
/// Returns `None` if the path has fewer than 2 points. When several segments
/// are equally close (a path that doubles back on itself), the lowest segment
/// index wins.
///
/// # Example
/// ```
/// use nearest_route::{GeoPoint, projection::nearest_on_path};
///
/// let path = vec![
///     GeoPoint::new(4.60, -74.08),
///     GeoPoint::new(4.61, -74.07),
///     GeoPoint::new(4.62, -74.07),
/// ];
/// let result = nearest_on_path(&GeoPoint::new(4.615, -74.069), &path).unwrap();
/// assert_eq!(result.segment_index, 1);
///
/// assert!(nearest_on_path(&GeoPoint::new(4.6, -74.08), &path[..1]).is_none());
/// ```
pub fn nearest_on_path(point: &GeoPoint, path: &[GeoPoint]) -> Option<ProjectionResult> {
    if path.len() < MIN_PATH_POINTS {
        return None;
    }

    let mut best: Option<ProjectionResult> = None;
    for (i, segment) in path.windows(2).enumerate() {
        let candidate = project_onto_segment(point, &segment[0], &segment[1]);
        // Strict comparison keeps the first minimum
        let better = best
            .as_ref()
            .map_or(true, |b| candidate.distance_meters < b.distance_meters);
        if better {
            best = Some(ProjectionResult {
                closest: candidate.closest,
                distance_meters: candidate.distance_meters,
                segment_index: i as u32,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::haversine_distance;

    fn scenario_a_path() -> Vec<GeoPoint> {
        vec![GeoPoint::new(4.60, -74.08), GeoPoint::new(4.61, -74.07)]
    }

    /// Planar distance in the frame a segment would use; comparable with
    /// `distance_meters` without mixing in haversine.
    fn planar_distance(a: &GeoPoint, b: &GeoPoint, reference_lat: f64) -> f64 {
        let frame = LocalFrame::new(reference_lat);
        let (ax, ay) = frame.to_xy(a);
        let (bx, by) = frame.to_xy(b);
        (ax - bx).hypot(ay - by)
    }

    #[test]
    fn test_fraction_is_clamped() {
        let a = GeoPoint::new(4.60, -74.08);
        let b = GeoPoint::new(4.61, -74.07);

        let before = project_onto_segment(&GeoPoint::new(4.59, -74.09), &a, &b);
        assert_eq!(before.fraction, 0.0);
        assert!((before.closest.latitude - a.latitude).abs() < 1e-12);
        assert!((before.closest.longitude - a.longitude).abs() < 1e-12);

        let after = project_onto_segment(&GeoPoint::new(4.62, -74.06), &a, &b);
        assert_eq!(after.fraction, 1.0);
        assert!((after.closest.latitude - b.latitude).abs() < 1e-12);
        assert!((after.closest.longitude - b.longitude).abs() < 1e-12);

        let side = project_onto_segment(&GeoPoint::new(4.70, -74.20), &a, &b);
        assert!((0.0..=1.0).contains(&side.fraction));
    }

    #[test]
    fn test_point_on_segment_has_zero_distance() {
        let a = GeoPoint::new(4.60, -74.08);
        let b = GeoPoint::new(4.61, -74.07);
        let on = GeoPoint::new(4.6025, -74.0775);

        let hit = project_onto_segment(&on, &a, &b);
        assert!(hit.distance_meters < 1.0);
        assert!((hit.fraction - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_segment_projects_to_start() {
        let a = GeoPoint::new(4.60, -74.08);
        let hit = project_onto_segment(&GeoPoint::new(4.601, -74.08), &a, &a);

        assert!(hit.fraction.abs() < 1e-6);
        assert!((hit.closest.latitude - a.latitude).abs() < 1e-9);
        assert!((hit.closest.longitude - a.longitude).abs() < 1e-9);
        assert!((hit.distance_meters - 111.132).abs() < 0.01);
    }

    #[test]
    fn test_nearest_on_path_requires_two_points() {
        let p = GeoPoint::new(4.605, -74.075);
        assert!(nearest_on_path(&p, &[]).is_none());
        assert!(nearest_on_path(&p, &[GeoPoint::new(4.60, -74.08)]).is_none());
    }

    #[test]
    fn test_scenario_midpoint() {
        let path = scenario_a_path();
        let result = nearest_on_path(&GeoPoint::new(4.605, -74.075), &path).unwrap();

        assert_eq!(result.segment_index, 0);
        assert!(result.distance_meters < 200.0);
        assert!((result.closest.latitude - 4.605).abs() < 1e-4);
        assert!((result.closest.longitude + 74.075).abs() < 1e-4);
        // Planar and haversine agree closely at this scale
        let reported = haversine_distance(&GeoPoint::new(4.605, -74.075), &result.closest);
        assert!((reported - result.distance_meters).abs() < 1.0);
    }

    #[test]
    fn test_equidistant_segments_pick_lowest_index() {
        // Path runs north and comes straight back: segments 0 and 1 overlap
        let path = vec![
            GeoPoint::new(4.600, -74.080),
            GeoPoint::new(4.610, -74.080),
            GeoPoint::new(4.600, -74.080),
        ];
        let result = nearest_on_path(&GeoPoint::new(4.605, -74.079), &path).unwrap();
        assert_eq!(result.segment_index, 0);
    }

    #[test]
    fn test_collinear_path_tie_at_shared_vertex() {
        // Three collinear points; a point beside the middle vertex is
        // equidistant to both segments
        let path = vec![
            GeoPoint::new(4.600, -74.080),
            GeoPoint::new(4.600, -74.070),
            GeoPoint::new(4.600, -74.060),
        ];
        let beside_middle = GeoPoint::new(4.601, -74.070);
        let first = project_onto_segment(&beside_middle, &path[0], &path[1]);
        let second = project_onto_segment(&beside_middle, &path[1], &path[2]);
        assert_eq!(first.distance_meters, second.distance_meters);

        let result = nearest_on_path(&beside_middle, &path).unwrap();
        assert_eq!(result.segment_index, 0);
    }

    #[test]
    fn test_nearest_never_farther_than_vertices() {
        let path = vec![
            GeoPoint::new(4.600, -74.080),
            GeoPoint::new(4.605, -74.072),
            GeoPoint::new(4.611, -74.075),
            GeoPoint::new(4.615, -74.066),
        ];
        let queries = [
            GeoPoint::new(4.603, -74.070),
            GeoPoint::new(4.620, -74.090),
            GeoPoint::new(4.598, -74.060),
            GeoPoint::new(4.611, -74.075),
        ];

        for q in &queries {
            let result = nearest_on_path(q, &path).unwrap();
            for (i, segment) in path.windows(2).enumerate() {
                let ref_lat = (segment[0].latitude + segment[1].latitude) / 2.0;
                for vertex in segment {
                    assert!(
                        result.distance_meters <= planar_distance(q, vertex, ref_lat) + 1e-6,
                        "segment {} vertex closer than projection",
                        i
                    );
                }
            }
        }
    }
}
