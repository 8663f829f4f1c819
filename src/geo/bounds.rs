use serde::{Deserialize, Serialize};

use crate::models::Coordinate;

use super::METERS_PER_DEGREE_LATITUDE;

/// Degrees of (latitude, longitude) covered by `meters` around `center`.
///
/// Longitude degrees shrink with cos(latitude); there is no antimeridian handling.
pub fn angular_span(center: Coordinate, meters: f64) -> (f64, f64) {
    let lat_span = meters / METERS_PER_DEGREE_LATITUDE;
    let cos_lat = center.latitude.to_radians().cos().abs().max(f64::EPSILON);
    let lon_span = meters / (METERS_PER_DEGREE_LATITUDE * cos_lat);
    (lat_span, lon_span)
}

/// Edges of the box used to decide which cached readings count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn around(center: Coordinate, radius_meters: f64) -> Self {
        let (lat_span, lon_span) = angular_span(center, radius_meters);
        Self {
            north: center.latitude + lat_span / 2.0,
            south: center.latitude - lat_span / 2.0,
            west: center.longitude - lon_span / 2.0,
            east: center.longitude + lon_span / 2.0,
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.latitude <= self.north
            && point.latitude >= self.south
            && point.longitude >= self.west
            && point.longitude <= self.east
    }
}

/// Corners of the region requested from the sensor API.
///
/// Kept separate from [`BoundingBox`]: the API wants a north-west and a
/// south-east corner, and this region is built once per fetch from a fixed
/// radius instead of the user's filter radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRegion {
    pub northwest: Coordinate,
    pub southeast: Coordinate,
}

impl QueryRegion {
    pub fn around(center: Coordinate, radius_meters: f64) -> Self {
        let (lat_span, lon_span) = angular_span(center, radius_meters);
        Self {
            northwest: Coordinate::new(
                center.latitude + lat_span / 2.0,
                center.longitude - lon_span / 2.0,
            ),
            southeast: Coordinate::new(
                center.latitude - lat_span / 2.0,
                center.longitude + lon_span / 2.0,
            ),
        }
    }

    pub fn covers(&self, filter: &BoundingBox) -> bool {
        self.northwest.latitude >= filter.north
            && self.southeast.latitude <= filter.south
            && self.northwest.longitude <= filter.west
            && self.southeast.longitude >= filter.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{MAX_FILTER_RADIUS_MILES, METERS_PER_MILE, QUERY_RADIUS_METERS};

    fn santa_cruz() -> Coordinate {
        Coordinate::new(36.97, -122.03)
    }

    #[test]
    fn test_box_contains_its_center() {
        for center in [santa_cruz(), Coordinate::new(-33.86, 151.2), Coordinate::new(0.0, 0.0)] {
            for radius in [1.0, 3218.0, QUERY_RADIUS_METERS] {
                let bbox = BoundingBox::around(center, radius);
                assert!(bbox.north > bbox.south);
                assert!(bbox.west < bbox.east);
                assert!(bbox.contains(&center));
            }
        }
    }

    #[test]
    fn test_box_excludes_points_outside_each_edge() {
        let center = santa_cruz();
        let bbox = BoundingBox::around(center, 2.0 * METERS_PER_MILE);

        assert!(!bbox.contains(&Coordinate::new(bbox.north + 0.001, center.longitude)));
        assert!(!bbox.contains(&Coordinate::new(bbox.south - 0.001, center.longitude)));
        assert!(!bbox.contains(&Coordinate::new(center.latitude, bbox.west - 0.001)));
        assert!(!bbox.contains(&Coordinate::new(center.latitude, bbox.east + 0.001)));
        assert!(!bbox.contains(&Coordinate::new(bbox.north + 1.0, bbox.east + 1.0)));
    }

    #[test]
    fn test_box_edges_are_inclusive() {
        let bbox = BoundingBox::around(santa_cruz(), 1000.0);
        assert!(bbox.contains(&Coordinate::new(bbox.north, bbox.west)));
        assert!(bbox.contains(&Coordinate::new(bbox.south, bbox.east)));
    }

    #[test]
    fn test_two_mile_box_size() {
        let bbox = BoundingBox::around(santa_cruz(), 2.0 * METERS_PER_MILE);
        let expected_half_lat = 3218.0 / METERS_PER_DEGREE_LATITUDE / 2.0;
        assert!((bbox.north - 36.97 - expected_half_lat).abs() < 1e-12);
        // Longitude span is wider than latitude span away from the equator.
        assert!(bbox.east - bbox.west > bbox.north - bbox.south);
    }

    #[test]
    fn test_query_region_corners() {
        let center = santa_cruz();
        let region = QueryRegion::around(center, QUERY_RADIUS_METERS);
        assert!(region.northwest.latitude > center.latitude);
        assert!(region.southeast.latitude < center.latitude);
        assert!(region.northwest.longitude < center.longitude);
        assert!(region.southeast.longitude > center.longitude);
    }

    #[test]
    fn test_query_region_covers_largest_filter_box() {
        let center = santa_cruz();
        let region = QueryRegion::around(center, QUERY_RADIUS_METERS);
        let widest = BoundingBox::around(center, MAX_FILTER_RADIUS_MILES * METERS_PER_MILE);
        assert!(region.covers(&widest));
        assert!(region.covers(&BoundingBox::around(center, 2.0 * METERS_PER_MILE)));
    }
}
