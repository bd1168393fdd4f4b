//! Best-route selection.
//!
//! Picks the route whose path passes closest to a destination. Ties go to the
//! first eligible route in input order; every variant here (sequential,
//! ranked, parallel) honors the same order so equidistant candidates always
//! resolve to the same route.

use log::debug;

use crate::projection::nearest_on_path;
use crate::{BestMatch, GeoPoint, Route, SelectionConfig};

/// Select the active route passing closest to `destination`.
///
/// Routes that are inactive or have fewer than 2 points are skipped. Returns
/// `None` if no route is eligible.
///
/// # Example
/// ```
/// use nearest_route::{select_best_route, GeoPoint, Route};
///
/// let routes = vec![
///     Route::new("far", "Far", vec![GeoPoint::new(4.65, -74.08), GeoPoint::new(4.66, -74.07)]),
///     Route::new("near", "Near", vec![GeoPoint::new(4.60, -74.08), GeoPoint::new(4.61, -74.07)]),
/// ];
/// let best = select_best_route(&GeoPoint::new(4.605, -74.075), &routes).unwrap();
/// assert_eq!(best.route_id, "near");
/// assert_eq!(best.route_index, 1);
/// ```
pub fn select_best_route(destination: &GeoPoint, routes: &[Route]) -> Option<BestMatch> {
    select_best_route_with_config(destination, routes, &SelectionConfig::default())
}

/// Select the closest eligible route under a custom configuration.
///
/// A match farther than `config.max_distance_meters` is reported as `None`.
pub fn select_best_route_with_config(
    destination: &GeoPoint,
    routes: &[Route],
    config: &SelectionConfig,
) -> Option<BestMatch> {
    let mut best: Option<BestMatch> = None;
    let mut eligible = 0usize;

    for candidate in candidates(destination, routes, config) {
        eligible += 1;
        // Strict comparison keeps the first minimum
        if best
            .as_ref()
            .map_or(true, |b| candidate.distance_meters() < b.distance_meters())
        {
            best = Some(candidate);
        }
    }

    debug!(
        "[NearestRoute] {} of {} routes eligible, best: {:?}",
        eligible,
        routes.len(),
        best.as_ref().map(|b| (&b.route_id, b.distance_meters()))
    );

    within_limit(best, config)
}

/// Every eligible route's match, closest first.
///
/// The sort is stable, so routes at equal distance keep their input order and
/// the first element is the same match [`select_best_route_with_config`]
/// returns. `max_distance_meters` drops matches beyond the limit.
pub fn rank_routes(
    destination: &GeoPoint,
    routes: &[Route],
    config: &SelectionConfig,
) -> Vec<BestMatch> {
    let mut ranked: Vec<BestMatch> = candidates(destination, routes, config)
        .filter(|m| !exceeds_limit(m, config))
        .collect();
    ranked.sort_by(|a, b| a.distance_meters().total_cmp(&b.distance_meters()));
    ranked
}

/// Parallel version of [`select_best_route_with_config`].
///
/// Projections run on the rayon pool; the reduction compares
/// `(distance, route_index)` so the result matches the sequential
/// tie-break exactly.
#[cfg(feature = "parallel")]
pub fn select_best_route_parallel(
    destination: &GeoPoint,
    routes: &[Route],
    config: &SelectionConfig,
) -> Option<BestMatch> {
    use rayon::prelude::*;

    let best = routes
        .par_iter()
        .enumerate()
        .filter(|(_, route)| config.is_eligible(route))
        .filter_map(|(i, route)| match_route(destination, i, route))
        .reduce_with(|a, b| {
            let a_key = (a.distance_meters(), a.route_index);
            let b_key = (b.distance_meters(), b.route_index);
            if b_key.0 < a_key.0 || (b_key.0 == a_key.0 && b_key.1 < a_key.1) {
                b
            } else {
                a
            }
        });

    within_limit(best, config)
}

/// Matches for eligible routes, in input order.
fn candidates<'a>(
    destination: &'a GeoPoint,
    routes: &'a [Route],
    config: &'a SelectionConfig,
) -> impl Iterator<Item = BestMatch> + 'a {
    routes
        .iter()
        .enumerate()
        .filter(move |(_, route)| config.is_eligible(route))
        // None should not happen after the length filter; skip rather than fail
        .filter_map(move |(i, route)| match_route(destination, i, route))
}

fn match_route(destination: &GeoPoint, index: usize, route: &Route) -> Option<BestMatch> {
    nearest_on_path(destination, &route.path).map(|projection| BestMatch {
        route_id: route.id.clone(),
        route_index: index as u32,
        projection,
    })
}

fn exceeds_limit(candidate: &BestMatch, config: &SelectionConfig) -> bool {
    config
        .max_distance_meters
        .is_some_and(|limit| candidate.distance_meters() > limit)
}

fn within_limit(best: Option<BestMatch>, config: &SelectionConfig) -> Option<BestMatch> {
    best.filter(|m| !exceeds_limit(m, config))
}
