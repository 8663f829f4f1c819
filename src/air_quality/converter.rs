use serde::{Deserialize, Serialize};

use crate::models::location::PLACEHOLDER;

/// Readings above this are treated as outside the sensor's range.
pub const MAX_VALID_CONCENTRATION: f32 = 1000.0;

/// One row of the PM2.5 breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Breakpoint {
    /// Row applies to concentrations strictly above this value.
    above: f32,
    index_high: f64,
    index_low: f64,
    conc_high: f64,
    conc_low: f64,
}

const fn row(
    above: f32,
    index_high: f64,
    index_low: f64,
    conc_high: f64,
    conc_low: f64,
) -> Breakpoint {
    Breakpoint {
        above,
        index_high,
        index_low,
        conc_high,
        conc_low,
    }
}

// Checked top to bottom; the last row catches everything from 0 up.
static BREAKPOINTS: [Breakpoint; 7] = [
    row(350.5, 500.0, 401.0, 500.0, 350.5),
    row(250.5, 400.0, 301.0, 350.4, 250.5),
    row(150.5, 300.0, 201.0, 250.4, 150.5),
    row(55.5, 200.0, 151.0, 150.4, 55.5),
    row(35.5, 150.0, 101.0, 55.4, 35.5),
    row(12.1, 100.0, 51.0, 35.4, 12.1),
    row(f32::NEG_INFINITY, 50.0, 0.0, 12.0, 0.0),
];

/// EPA health category for an index value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Returns `None` for negative (or NaN) indices.
    pub fn from_index(index: f32) -> Option<Self> {
        if index >= 301.0 {
            Some(AqiCategory::Hazardous)
        } else if index >= 201.0 {
            Some(AqiCategory::VeryUnhealthy)
        } else if index >= 151.0 {
            Some(AqiCategory::Unhealthy)
        } else if index >= 101.0 {
            Some(AqiCategory::UnhealthyForSensitiveGroups)
        } else if index >= 51.0 {
            Some(AqiCategory::Moderate)
        } else if index >= 0.0 {
            Some(AqiCategory::Good)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// EPA reporting color for the category.
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "green",
            AqiCategory::Moderate => "yellow",
            AqiCategory::UnhealthyForSensitiveGroups => "orange",
            AqiCategory::Unhealthy => "red",
            AqiCategory::VeryUnhealthy => "purple",
            AqiCategory::Hazardous => "maroon",
        }
    }
}

/// An index value (if the input was usable) plus its display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AqiResult {
    pub index: Option<f32>,
    pub category: String,
}

impl Default for AqiResult {
    fn default() -> Self {
        Self::unset()
    }
}

impl AqiResult {
    pub fn unset() -> Self {
        Self {
            index: None,
            category: PLACEHOLDER.to_string(),
        }
    }

    pub fn from_concentration(concentration: f32) -> Self {
        let index = convert_to_index(concentration);
        let category = index
            .and_then(AqiCategory::from_index)
            .map(|c| c.label())
            .unwrap_or(PLACEHOLDER);
        Self {
            index,
            category: category.to_string(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.index.is_some()
    }

    /// Text for a compact status display: the whole-number index or `--`.
    pub fn status_title(&self) -> String {
        match self.index {
            Some(index) => format!("{index:.0}"),
            None => PLACEHOLDER.to_string(),
        }
    }
}

/// Convert a PM2.5 concentration (µg/m³) to an AQI value.
///
/// Returns `None` for NaN and for anything above [`MAX_VALID_CONCENTRATION`].
/// Zero and negative inputs are returned unchanged rather than interpolated.
/// Otherwise the EPA formula is applied and rounded half away from zero:
///
/// `AQI = ((Ih - Il) / (BPh - BPl)) * (C - BPl) + Il`
///
/// ```
/// use aqi_status_lib::air_quality::convert_to_index;
///
/// assert_eq!(convert_to_index(10.0), Some(42.0));
/// assert_eq!(convert_to_index(f32::NAN), None);
/// ```
pub fn convert_to_index(concentration: f32) -> Option<f32> {
    if concentration.is_nan() || concentration > MAX_VALID_CONCENTRATION {
        return None;
    }
    if concentration <= 0.0 {
        return Some(concentration);
    }

    let bp = BREAKPOINTS
        .iter()
        .find(|bp| concentration > bp.above)
        .unwrap_or(&BREAKPOINTS[BREAKPOINTS.len() - 1]);

    let c = f64::from(concentration);
    let index = ((bp.index_high - bp.index_low) / (bp.conc_high - bp.conc_low)) * (c - bp.conc_low)
        + bp.index_low;
    Some(index.round() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_to_index_known_values() {
        assert_eq!(convert_to_index(10.0), Some(42.0));
        assert_eq!(convert_to_index(12.0), Some(50.0));
        assert_eq!(convert_to_index(12.1), Some(50.0));
        assert_eq!(convert_to_index(12.2), Some(51.0));
        assert_eq!(convert_to_index(35.5), Some(100.0));
        assert_eq!(convert_to_index(40.0), Some(112.0));
        assert_eq!(convert_to_index(55.6), Some(151.0));
        assert_eq!(convert_to_index(150.6), Some(201.0));
        assert_eq!(convert_to_index(250.6), Some(301.0));
        assert_eq!(convert_to_index(350.6), Some(401.0));
        assert_eq!(convert_to_index(500.0), Some(500.0));
    }

    #[test]
    fn test_convert_to_index_out_of_range() {
        assert_eq!(convert_to_index(f32::NAN), None);
        assert_eq!(convert_to_index(1000.0001), None);
        assert_eq!(convert_to_index(1000.0), Some(831.0));

        let result = AqiResult::from_concentration(1000.0001);
        assert_eq!(result, AqiResult::unset());
        assert_eq!(result.category, "--");
        assert_eq!(AqiResult::from_concentration(f32::NAN).category, "--");
    }

    #[test]
    fn test_non_positive_passes_through() {
        assert_eq!(convert_to_index(0.0), Some(0.0));
        assert_eq!(convert_to_index(-5.0), Some(-5.0));

        assert_eq!(AqiResult::from_concentration(0.0).category, "Good");
        let negative = AqiResult::from_concentration(-5.0);
        assert_eq!(negative.index, Some(-5.0));
        assert_eq!(negative.category, "--");
    }

    #[test]
    fn test_index_is_monotonic_and_within_bucket() {
        let mut previous = f32::NEG_INFINITY;
        let mut c = 0.0_f32;
        while c <= MAX_VALID_CONCENTRATION {
            let index = convert_to_index(c).unwrap();
            assert!(index >= previous, "index dropped at {c}: {index} < {previous}");
            previous = index;

            if c > 0.0 {
                let row = BREAKPOINTS.iter().position(|bp| c > bp.above).unwrap();
                let bp = BREAKPOINTS[row];
                assert!(f64::from(index) >= bp.index_low, "{c} -> {index} below row {row}");
                if row > 0 {
                    assert!(f64::from(index) <= bp.index_high, "{c} -> {index} above row {row}");
                }
            }
            c += 0.05;
        }
    }

    #[test]
    fn test_category_labels() {
        let label = |index: f32| AqiCategory::from_index(index).map(|c| c.label());
        assert_eq!(label(0.0), Some("Good"));
        assert_eq!(label(50.0), Some("Good"));
        assert_eq!(label(51.0), Some("Moderate"));
        assert_eq!(label(101.0), Some("Unhealthy for Sensitive Groups"));
        assert_eq!(label(151.0), Some("Unhealthy"));
        assert_eq!(label(201.0), Some("Very Unhealthy"));
        assert_eq!(label(301.0), Some("Hazardous"));
        assert_eq!(label(831.0), Some("Hazardous"));
        assert_eq!(label(-1.0), None);
        assert_eq!(AqiCategory::Hazardous.color(), "maroon");
    }

    #[test]
    fn test_status_title() {
        assert_eq!(AqiResult::unset().status_title(), "--");
        assert_eq!(AqiResult::from_concentration(10.0).status_title(), "42");
    }
}
