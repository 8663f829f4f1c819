use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};

use crate::geocoding::zippopotam;
use crate::models::FilterSettings;
use crate::sensors::purple_air;

pub const DEFAULT_POSTAL_CODE: &str = "95062";
pub const DEFAULT_REFRESH_SECS: u64 = 15 * 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

const ENV_POSTAL_CODE: &str = "AQI_STATUS_POSTAL_CODE";
const ENV_RADIUS_MILES: &str = "AQI_STATUS_RADIUS_MILES";
const ENV_CORRECTION: &str = "AQI_STATUS_CORRECTION";
const ENV_WINDOW: &str = "AQI_STATUS_WINDOW";
const ENV_REFRESH_SECS: &str = "AQI_STATUS_REFRESH_SECS";
const ENV_DEBUG: &str = "AQI_STATUS_DEBUG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorApiSettings {
    pub base_url: String,
    pub options: String,
}

impl Default for SensorApiSettings {
    fn default() -> Self {
        Self {
            base_url: purple_air::DEFAULT_BASE_URL.into(),
            options: purple_air::DEFAULT_OPTIONS.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeocoderSettings {
    pub base_url: String,
    pub country: String,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: zippopotam::DEFAULT_BASE_URL.into(),
            country: zippopotam::DEFAULT_COUNTRY.into(),
        }
    }
}

/// Startup configuration. Read once; never written back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub postal_code: String,
    pub filter: FilterSettings,
    pub sensor_api: SensorApiSettings,
    pub geocoder: GeocoderSettings,
    pub request_timeout_secs: u64,
    pub refresh_interval_secs: u64,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            postal_code: DEFAULT_POSTAL_CODE.into(),
            filter: FilterSettings::default(),
            sensor_api: SensorApiSettings::default(),
            geocoder: GeocoderSettings::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            debug: false,
        }
    }
}

impl Settings {
    /// Load from `path` if it exists, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| env::var(key).ok())
    }

    fn load_with(path: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings from {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Invalid settings file {}", path.display()))?
            }
            _ => Settings::default(),
        };

        settings.apply_overrides(lookup)?;
        settings.filter.radius_miles = FilterSettings::clamp_radius(settings.filter.radius_miles);
        Ok(settings)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(postal_code) = lookup(ENV_POSTAL_CODE) {
            self.postal_code = postal_code.trim().to_string();
        }
        if let Some(radius) = lookup(ENV_RADIUS_MILES) {
            self.filter.radius_miles = radius
                .trim()
                .parse()
                .with_context(|| format!("{ENV_RADIUS_MILES} must be a number, got '{radius}'"))?;
        }
        if let Some(model) = lookup(ENV_CORRECTION) {
            self.filter.correction = model.parse().map_err(|e| anyhow!("{ENV_CORRECTION}: {e}"))?;
        }
        if let Some(window) = lookup(ENV_WINDOW) {
            self.filter.window = window.parse().map_err(|e| anyhow!("{ENV_WINDOW}: {e}"))?;
        }
        if let Some(secs) = lookup(ENV_REFRESH_SECS) {
            self.refresh_interval_secs = secs
                .trim()
                .parse()
                .with_context(|| {
                    format!("{ENV_REFRESH_SECS} must be whole seconds, got '{secs}'")
                })?;
        }
        if let Some(value) = lookup(ENV_DEBUG) {
            self.debug = value == "1" || value.eq_ignore_ascii_case("true");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}
