use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::air_quality::AqiResult;
use crate::geo::{BoundingBox, QueryRegion};
use crate::models::{FilterSettings, Location, Reading, ResolvedLocation};

use super::{AqiUpdate, UpdateError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MonitorStatus {
    Idle,
    Resolving,
    BoxReady,
    Fetching,
    Ready,
    /// The attempt failed. Left for `Idle` once the cached fields are reset.
    Error,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        MonitorStatus::Idle
    }
}

/// Everything the monitor has learned so far, guarded by one lock.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub status: MonitorStatus,
    pub location: Location,
    pub settings: FilterSettings,
    pub query_region: Option<QueryRegion>,
    pub filter_box: Option<BoundingBox>,
    /// Last fetched sensor set; reused until the next fetch.
    pub readings: Vec<Reading>,
    pub result: AqiResult,
    pub included_count: usize,
    pub average_concentration: Option<f32>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_error: Option<UpdateError>,
}

impl MonitorState {
    pub fn new(postal_code: impl Into<String>, settings: FilterSettings) -> Self {
        Self {
            status: MonitorStatus::Idle,
            location: Location::new(postal_code),
            settings,
            query_region: None,
            filter_box: None,
            readings: Vec::new(),
            result: AqiResult::unset(),
            included_count: 0,
            average_concentration: None,
            fetched_at: None,
            last_error: None,
        }
    }

    pub fn begin_resolving(&mut self) -> String {
        self.status = MonitorStatus::Resolving;
        self.location.postal_code.clone()
    }

    pub fn apply_location(
        &mut self,
        resolved: ResolvedLocation,
        query_radius_meters: f64,
    ) -> QueryRegion {
        let region = QueryRegion::around(resolved.coordinate, query_radius_meters);
        self.location.apply(resolved);
        self.query_region = Some(region);
        self.status = MonitorStatus::BoxReady;
        region
    }

    pub fn begin_fetching(&mut self) {
        self.status = MonitorStatus::Fetching;
    }

    pub fn store_readings(&mut self, readings: Vec<Reading>, fetched_at: DateTime<Utc>) {
        self.readings = readings;
        self.fetched_at = Some(fetched_at);
        self.last_error = None;
        self.status = MonitorStatus::Ready;
    }

    /// Filter the cached readings around the resolved location and convert.
    ///
    /// Needs a completed fetch; the cached readings are not touched.
    pub fn recalculate(&mut self, is_fresh_fetch: bool) -> Result<AqiUpdate, UpdateError> {
        if self.status != MonitorStatus::Ready {
            return Err(UpdateError::NotReady);
        }
        let center = self.location.coordinate.ok_or(UpdateError::NotReady)?;

        let filter_box = BoundingBox::around(center, self.settings.radius_meters());
        let (mean, count) = average_within(&self.readings, &filter_box);
        // An empty filter box passes the zero mean through uncorrected.
        let concentration = if count > 0 {
            self.settings.correction.apply(mean)
        } else {
            mean
        };

        self.filter_box = Some(filter_box);
        self.included_count = count;
        self.average_concentration = Some(concentration);
        self.result = AqiResult::from_concentration(concentration);

        Ok(self.to_update(is_fresh_fetch))
    }

    pub fn fail(&mut self, error: UpdateError) {
        self.status = MonitorStatus::Error;
        self.last_error = Some(error);
    }

    /// Forget everything learned from the network and go back to `Idle`.
    /// The postal code, filter settings and last error stay.
    pub fn reset(&mut self) {
        self.status = MonitorStatus::Idle;
        self.location.reset();
        self.query_region = None;
        self.filter_box = None;
        self.readings.clear();
        self.result = AqiResult::unset();
        self.included_count = 0;
        self.average_concentration = None;
        self.fetched_at = None;
    }

    pub fn to_update(&self, is_fresh_fetch: bool) -> AqiUpdate {
        AqiUpdate {
            status_title: self.result.status_title(),
            result: self.result.clone(),
            postal_code: self.location.postal_code.clone(),
            city: self.location.city_label().to_string(),
            region: self.location.region_label().to_string(),
            is_fresh_fetch,
            included_readings: self.included_count,
            average_concentration: self.average_concentration,
            fetched_at: self.fetched_at,
        }
    }
}

/// Arithmetic mean of the readings inside `bbox` and how many there were.
///
/// The mean is 0 when nothing is inside.
pub fn average_within(readings: &[Reading], bbox: &BoundingBox) -> (f32, usize) {
    let (sum, count) = readings
        .iter()
        .filter(|r| bbox.contains(&r.coordinate))
        .fold((0.0_f64, 0_usize), |(sum, count), r| {
            (sum + f64::from(r.concentration), count + 1)
        });

    if count == 0 {
        (0.0, 0)
    } else {
        ((sum / count as f64) as f32, count)
    }
}
