//! Route drafts as built in the route editor.
//!
//! An administrator clicks points onto the map, can undo the last point or
//! clear the whole polyline, and saves the draft as a [`Route`]. Saving
//! requires a non-blank name and at least 2 valid points. Optional text
//! fields are trimmed and blank values dropped.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{GeoPoint, NearestRouteError, Result, Route};

/// An unsaved route being drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDraft {
    pub name: String,
    pub origin_address: String,
    pub destination_address: String,
    pub company: String,
    pub active: bool,
    path: Vec<GeoPoint>,
}

impl RouteDraft {
    /// New draft; drafts start out active.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            ..Self::default()
        }
    }

    /// Append a clicked point to the end of the polyline.
    pub fn add_point(&mut self, point: GeoPoint) {
        self.path.push(point);
    }

    /// Remove the last point, if any.
    pub fn undo_point(&mut self) -> Option<GeoPoint> {
        self.path.pop()
    }

    /// Remove every point.
    pub fn clear_points(&mut self) {
        self.path.clear();
    }

    pub fn point_count(&self) -> usize {
        self.path.len()
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }

    /// Validate the draft and turn it into a [`Route`] with the given id.
    ///
    /// # Example
    /// ```
    /// use nearest_route::{GeoPoint, RouteDraft};
    ///
    /// let mut draft = RouteDraft::new("  Ruta 12  ");
    /// draft.add_point(GeoPoint::new(4.60, -74.08));
    /// assert!(draft.clone().into_route("r12").is_err());
    ///
    /// draft.add_point(GeoPoint::new(4.61, -74.07));
    /// let route = draft.into_route("r12").unwrap();
    /// assert_eq!(route.name, "Ruta 12");
    /// assert!(route.company.is_none());
    /// ```
    pub fn into_route(self, id: impl Into<String>) -> Result<Route> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(NearestRouteError::MissingName);
        }

        let route = Route {
            id: id.into(),
            name: name.to_string(),
            active: self.active,
            path: self.path,
            origin_address: non_blank(&self.origin_address),
            destination_address: non_blank(&self.destination_address),
            company: non_blank(&self.company),
        };
        route.validate()?;

        debug!(
            "[NearestRoute] Draft saved as {} ({} points, {:.0}m)",
            route.id,
            route.path.len(),
            route.length_meters()
        );
        Ok(route)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
