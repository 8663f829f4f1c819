use serde::{Deserialize, Serialize};

/// Placeholder shown for any label that has not been resolved.
pub const PLACEHOLDER: &str = "--";

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Output of a successful postal code lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub city: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub postal_code: String,
    pub coordinate: Option<Coordinate>,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl Location {
    pub fn new(postal_code: impl Into<String>) -> Self {
        Self {
            postal_code: postal_code.into(),
            coordinate: None,
            city: None,
            region: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.coordinate.is_some()
    }

    pub fn apply(&mut self, resolved: ResolvedLocation) {
        self.coordinate = Some(resolved.coordinate);
        self.city = Some(resolved.city);
        self.region = Some(resolved.region);
    }

    /// Drops everything learned from the last lookup but keeps the postal code.
    pub fn reset(&mut self) {
        self.coordinate = None;
        self.city = None;
        self.region = None;
    }

    pub fn city_label(&self) -> &str {
        self.city.as_deref().unwrap_or(PLACEHOLDER)
    }

    pub fn region_label(&self) -> &str {
        self.region.as_deref().unwrap_or(PLACEHOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_postal_code() {
        let mut location = Location::new("95062");
        location.apply(ResolvedLocation {
            coordinate: Coordinate::new(36.97, -122.03),
            city: "Santa Cruz".into(),
            region: "CA".into(),
        });
        assert!(location.is_resolved());
        assert_eq!(location.city_label(), "Santa Cruz");

        location.reset();
        assert!(!location.is_resolved());
        assert_eq!(location.postal_code, "95062");
        assert_eq!(location.city_label(), PLACEHOLDER);
        assert_eq!(location.region_label(), PLACEHOLDER);
    }
}
