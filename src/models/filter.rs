use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::air_quality::CorrectionModel;
use crate::geo::{MAX_FILTER_RADIUS_MILES, METERS_PER_MILE};

pub const DEFAULT_FILTER_RADIUS_MILES: f64 = 2.0;

/// Upstream averaging period for each sensor's PM2.5 value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AveragingWindow {
    Realtime,
    TenMinutes,
    ThirtyMinutes,
    OneHour,
    OneDay,
    OneWeek,
}

impl Default for AveragingWindow {
    fn default() -> Self {
        AveragingWindow::TenMinutes
    }
}

impl AveragingWindow {
    pub const ALL: [AveragingWindow; 6] = [
        AveragingWindow::Realtime,
        AveragingWindow::TenMinutes,
        AveragingWindow::ThirtyMinutes,
        AveragingWindow::OneHour,
        AveragingWindow::OneDay,
        AveragingWindow::OneWeek,
    ];

    /// Name of the concentration column the sensor API returns for this window.
    ///
    /// `pm_4` is the six hour average, which is not offered.
    pub fn field_name(&self) -> &'static str {
        match self {
            AveragingWindow::Realtime => "pm_0",
            AveragingWindow::TenMinutes => "pm_1",
            AveragingWindow::ThirtyMinutes => "pm_2",
            AveragingWindow::OneHour => "pm_3",
            AveragingWindow::OneDay => "pm_5",
            AveragingWindow::OneWeek => "pm_6",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AveragingWindow::Realtime => "realtime",
            AveragingWindow::TenMinutes => "10m",
            AveragingWindow::ThirtyMinutes => "30m",
            AveragingWindow::OneHour => "1h",
            AveragingWindow::OneDay => "1d",
            AveragingWindow::OneWeek => "1w",
        }
    }
}

impl fmt::Display for AveragingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AveragingWindow {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "realtime" | "now" => Ok(AveragingWindow::Realtime),
            "10m" | "10min" | "tenminutes" => Ok(AveragingWindow::TenMinutes),
            "30m" | "30min" | "thirtyminutes" => Ok(AveragingWindow::ThirtyMinutes),
            "1h" | "60m" | "onehour" => Ok(AveragingWindow::OneHour),
            "1d" | "24h" | "oneday" => Ok(AveragingWindow::OneDay),
            "1w" | "7d" | "oneweek" => Ok(AveragingWindow::OneWeek),
            other => Err(format!("unknown averaging window '{other}'")),
        }
    }
}

/// User-adjustable knobs applied when turning cached readings into an index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSettings {
    pub radius_miles: f64,
    pub correction: CorrectionModel,
    pub window: AveragingWindow,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            radius_miles: DEFAULT_FILTER_RADIUS_MILES,
            correction: CorrectionModel::None,
            window: AveragingWindow::default(),
        }
    }
}

impl FilterSettings {
    pub fn radius_meters(&self) -> f64 {
        self.radius_miles * METERS_PER_MILE
    }

    /// Radius clamped to what the cached query region can cover.
    pub fn clamp_radius(radius_miles: f64) -> f64 {
        if radius_miles.is_nan() || radius_miles <= 0.0 {
            DEFAULT_FILTER_RADIUS_MILES
        } else {
            radius_miles.min(MAX_FILTER_RADIUS_MILES)
        }
    }
}
