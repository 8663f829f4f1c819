use serde_json::Value;

use crate::models::{Coordinate, Reading};

use super::FetchError;

// Column positions within each row of the `data` array.
const COL_CONCENTRATION: usize = 2;
const COL_PLACEMENT: usize = 4;
const COL_LATITUDE: usize = 6;
const COL_LONGITUDE: usize = 7;
const COL_QUALITY_FLAG: usize = 9;

const PLACEMENT_OUTDOOR: f64 = 0.0;
const QUALITY_GOOD: f64 = 0.0;

/// Turn a sensor map response body into outdoor, good-quality readings.
///
/// Indoor rows, flagged rows and rows with missing or mistyped columns are
/// dropped; only a body that is empty, not JSON, or lacks the top-level
/// `data` array fails.
pub fn parse_readings(body: &str) -> Result<Vec<Reading>, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::NoData);
    }

    let json: Value = serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let rows = json
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FetchError::Decode("missing 'data' array".to_string()))?;

    Ok(rows.iter().filter_map(parse_row).collect())
}

fn parse_row(row: &Value) -> Option<Reading> {
    let row = row.as_array()?;
    let column = |idx: usize| row.get(idx).and_then(Value::as_f64);

    if column(COL_PLACEMENT)? != PLACEMENT_OUTDOOR || column(COL_QUALITY_FLAG)? != QUALITY_GOOD {
        return None;
    }

    let concentration = column(COL_CONCENTRATION)?;
    let latitude = column(COL_LATITUDE)?;
    let longitude = column(COL_LONGITUDE)?;

    Some(Reading::new(
        concentration as f32,
        Coordinate::new(latitude, longitude),
    ))
}
