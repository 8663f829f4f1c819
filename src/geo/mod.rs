pub mod bounds;

pub use bounds::{angular_span, BoundingBox, QueryRegion};

pub const METERS_PER_MILE: f64 = 1609.0;

/// Approximate length of one degree of latitude.
pub const METERS_PER_DEGREE_LATITUDE: f64 = 111_320.0;

/// Largest filter radius a user can select.
pub const MAX_FILTER_RADIUS_MILES: f64 = 10.0;

/// Size of the region requested from the sensor API on every fetch (about 16.1 km).
///
/// Derived from the largest selectable filter radius so a cached fetch always
/// covers any filter box built from it.
pub const QUERY_RADIUS_METERS: f64 = MAX_FILTER_RADIUS_MILES * METERS_PER_MILE;
