//! Unified error handling for the nearest-route library.
//!
//! Nearest-route queries never fail: missing data is reported as `None`.
//! This error type covers the fallible edges around them, such as validating a
//! route before it is saved, loading a catalog document and looking up routes
//! by id.

use thiserror::Error;

/// Unified error type for nearest-route operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum NearestRouteError {
    /// Route has too few points to form a segment
    #[error("Route '{route_id}' has {point_count} points, minimum {minimum_required} required")]
    InsufficientPoints {
        route_id: String,
        point_count: usize,
        minimum_required: usize,
    },
    /// Route has out-of-range or non-finite coordinates
    #[error("Route '{route_id}' has invalid coordinates: {message}")]
    InvalidCoordinates { route_id: String, message: String },
    /// Route draft is missing its name
    #[error("Route name is required")]
    MissingName,
    /// No route with this id in the catalog
    #[error("Route '{route_id}' not found")]
    RouteNotFound { route_id: String },
    /// Route catalog document could not be read
    #[error("Catalog error: {message}")]
    Catalog { message: String },
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<serde_json::Error> for NearestRouteError {
    fn from(err: serde_json::Error) -> Self {
        NearestRouteError::Catalog {
            message: err.to_string(),
        }
    }
}

/// Result type alias for nearest-route operations.
pub type Result<T> = std::result::Result<T, NearestRouteError>;

/// Extension trait for converting Option to NearestRouteError.
pub trait OptionExt<T> {
    /// Convert Option to Result with insufficient points error.
    fn ok_or_insufficient_points(self, route_id: &str, point_count: usize) -> Result<T>;

    /// Convert Option to Result with route-not-found error.
    fn ok_or_not_found(self, route_id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_insufficient_points(self, route_id: &str, point_count: usize) -> Result<T> {
        self.ok_or_else(|| NearestRouteError::InsufficientPoints {
            route_id: route_id.to_string(),
            point_count,
            minimum_required: crate::MIN_PATH_POINTS,
        })
    }

    fn ok_or_not_found(self, route_id: &str) -> Result<T> {
        self.ok_or_else(|| NearestRouteError::RouteNotFound {
            route_id: route_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NearestRouteError::InsufficientPoints {
            route_id: "ruta-7".to_string(),
            point_count: 1,
            minimum_required: 2,
        };
        assert!(err.to_string().contains("ruta-7"));
        assert!(err.to_string().contains("1 points"));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_insufficient_points("test", 0);
        assert!(matches!(
            result,
            Err(NearestRouteError::InsufficientPoints {
                minimum_required: 2,
                ..
            })
        ));

        let found = Some(3).ok_or_not_found("test");
        assert_eq!(found, Ok(3));
    }

    #[test]
    fn test_json_error_becomes_catalog_error() {
        let err: NearestRouteError = serde_json::from_str::<Vec<u8>>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, NearestRouteError::Catalog { .. }));
    }
}
