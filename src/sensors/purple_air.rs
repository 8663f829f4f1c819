use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::geo::QueryRegion;
use crate::models::{AveragingWindow, Reading};

use super::{parse_readings, FetchError, SensorSource};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const DEFAULT_BASE_URL: &str = "https://www.purpleair.com/data.json";
pub const DEFAULT_OPTIONS: &str = "opt=1/mAQI/a10/cC0";

pub struct PurpleAirClient {
    base_url: String,
    options: String,
    client: reqwest::Client,
}

impl PurpleAirClient {
    pub fn new(base_url: &str, options: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("http client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches(&['/', '?'][..]).to_string(),
            options: options.trim_start_matches(&['?', '&'][..]).to_string(),
            client,
        })
    }

    pub fn request_url(
        &self,
        region: &QueryRegion,
        window: AveragingWindow,
    ) -> Result<Url, FetchError> {
        let raw = format!(
            "{}?{}&fetch=true&nwlat={}&selat={}&nwlng={}&selng={}&fields={},",
            self.base_url,
            self.options,
            region.northwest.latitude,
            region.southeast.latitude,
            region.northwest.longitude,
            region.southeast.longitude,
            window.field_name(),
        );
        Url::parse(&raw).map_err(|e| FetchError::BadUrl(format!("{raw}: {e}")))
    }
}

#[async_trait]
impl SensorSource for PurpleAirClient {
    async fn fetch_readings(
        &self,
        region: &QueryRegion,
        window: AveragingWindow,
    ) -> Result<Vec<Reading>, FetchError> {
        let url = self.request_url(region, window)?;
        log_info!("requesting sensors ({window}) from {url}");

        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::NoResponse
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            log_warn!("sensor service answered HTTP {status}");
            return Err(FetchError::Transport(format!("HTTP {status}")));
        }

        let body = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::NoResponse
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let readings = parse_readings(&body)?;
        log_info!("sensor response: {} bytes, {} usable readings", body.len(), readings.len());
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn client(base: &str) -> PurpleAirClient {
        PurpleAirClient::new(base, DEFAULT_OPTIONS, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_request_url_carries_region_and_field() {
        let region = QueryRegion {
            northwest: Coordinate::new(37.04, -122.12),
            southeast: Coordinate::new(36.9, -121.94),
        };
        let url = client(DEFAULT_BASE_URL)
            .request_url(&region, AveragingWindow::OneHour)
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://www.purpleair.com/data.json?opt=1/mAQI/a10/cC0&fetch=true\
             &nwlat=37.04&selat=36.9&nwlng=-122.12&selng=-121.94&fields=pm_3,"
        );
    }

    #[test]
    fn test_request_url_rejects_bad_base() {
        let region = QueryRegion {
            northwest: Coordinate::new(1.0, 0.0),
            southeast: Coordinate::new(0.0, 1.0),
        };
        let result = client("not a url").request_url(&region, AveragingWindow::Realtime);
        assert!(matches!(result, Err(FetchError::BadUrl(_))));
    }
}
