//! Resolver backed by the Zippopotam.us postal code service.
//!
//! `GET {base}/{country}/{postal}` returns
//! `{"places": [{"place name", "latitude", "longitude", "state", "state abbreviation"}]}`
//! with the coordinates as strings. Only the first place is used.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::models::{Coordinate, ResolvedLocation};

use super::{LocationResolver, ResolveError};

pub const DEFAULT_BASE_URL: &str = "https://api.zippopotam.us";
pub const DEFAULT_COUNTRY: &str = "us";

#[derive(Debug, Deserialize)]
struct PostalLookup {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(rename = "place name")]
    place_name: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    state: Option<String>,
    #[serde(rename = "state abbreviation")]
    state_abbreviation: Option<String>,
}

pub struct ZippopotamResolver {
    base_url: String,
    country: String,
    client: reqwest::Client,
}

impl ZippopotamResolver {
    pub fn new(base_url: &str, country: &str, timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::LookupFailed(format!("http client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            country: country.to_string(),
            client,
        })
    }

    pub fn lookup_url(&self, postal_code: &str) -> Result<Url, ResolveError> {
        let postal_code = postal_code.trim();
        if postal_code.is_empty() {
            return Err(ResolveError::LookupFailed("postal code is empty".into()));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ResolveError::LookupFailed(format!("bad geocoder url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ResolveError::LookupFailed("geocoder url cannot take a path".into()))?
            .pop_if_empty()
            .push(&self.country)
            .push(postal_code);
        Ok(url)
    }
}

#[async_trait]
impl LocationResolver for ZippopotamResolver {
    async fn resolve(&self, postal_code: &str) -> Result<ResolvedLocation, ResolveError> {
        let url = self.lookup_url(postal_code)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::LookupFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ResolveError::LookupFailed(format!(
                "no match for '{}' (HTTP {})",
                postal_code,
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ResolveError::LookupFailed(e.to_string()))?;
        parse_lookup(&body)
    }
}

pub fn parse_lookup(body: &str) -> Result<ResolvedLocation, ResolveError> {
    let lookup: PostalLookup = serde_json::from_str(body)
        .map_err(|e| ResolveError::LookupFailed(format!("unreadable lookup response: {e}")))?;

    let place = lookup
        .places
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::LookupFailed("no places for postal code".into()))?;

    let latitude = parse_degrees(place.latitude.as_deref()).ok_or(ResolveError::MissingCoordinate)?;
    let longitude =
        parse_degrees(place.longitude.as_deref()).ok_or(ResolveError::MissingCoordinate)?;

    let city = non_empty(place.place_name).ok_or(ResolveError::MissingCity)?;
    let region = non_empty(place.state_abbreviation)
        .or_else(|| non_empty(place.state))
        .ok_or(ResolveError::MissingRegion)?;

    Ok(ResolvedLocation {
        coordinate: Coordinate::new(latitude, longitude),
        city,
        region,
    })
}

fn parse_degrees(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
