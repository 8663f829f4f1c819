//! Outdoor PM2.5 readings from the PurpleAir map endpoint.

pub mod parse;
pub mod purple_air;

use async_trait::async_trait;

use crate::geo::QueryRegion;
use crate::models::{AveragingWindow, Reading};

pub use parse::parse_readings;
pub use purple_air::PurpleAirClient;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("could not build sensor request url: {0}")]
    BadUrl(String),
    #[error("sensor request failed: {0}")]
    Transport(String),
    #[error("no response from sensor service")]
    NoResponse,
    #[error("sensor service returned an empty body")]
    NoData,
    #[error("could not decode sensor response: {0}")]
    Decode(String),
}

/// Anything that can list the sensor readings inside a region.
///
/// One request per call, no retries.
#[async_trait]
pub trait SensorSource: Send + Sync {
    async fn fetch_readings(
        &self,
        region: &QueryRegion,
        window: AveragingWindow,
    ) -> Result<Vec<Reading>, FetchError>;
}
