//! Neighborhood air quality from nearby outdoor PM2.5 sensors.
//!
//! A postal code is resolved to a coordinate, sensors around it are fetched
//! from the PurpleAir map endpoint, readings inside the user's radius are
//! averaged, optionally corrected, and converted to an EPA AQI value.
//! [`monitor::AqiMonitor`] ties the steps together and publishes each result.

pub mod air_quality;
pub mod geo;
pub mod geocoding;
pub mod models;
pub mod monitor;
pub mod sensors;
pub mod settings;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;

use geocoding::ZippopotamResolver;
use monitor::{AqiMonitor, MonitorEvent};
use sensors::PurpleAirClient;
use settings::Settings;

const ENV_CONFIG_PATH: &str = "AQI_STATUS_CONFIG";

/// Load settings, start the monitor and log every update until Ctrl-C.
///
/// The settings file comes from the first argument or `AQI_STATUS_CONFIG`.
pub async fn run() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(ENV_CONFIG_PATH))
        .map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref())?;

    utils::logging::init(settings.debug);
    info!(
        "AQI Status starting up for postal code {} ({} mi, {}, correction {})",
        settings.postal_code,
        settings.filter.radius_miles,
        settings.filter.window,
        settings.filter.correction
    );

    let resolver = ZippopotamResolver::new(
        &settings.geocoder.base_url,
        &settings.geocoder.country,
        settings.request_timeout(),
    )?;
    let sensors = PurpleAirClient::new(
        &settings.sensor_api.base_url,
        &settings.sensor_api.options,
        settings.request_timeout(),
    )?;

    let monitor = AqiMonitor::new(
        Arc::new(resolver),
        Arc::new(sensors),
        settings.postal_code.clone(),
        settings.filter,
        settings.refresh_interval(),
    );

    let mut events = monitor.subscribe();
    let reporter = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(MonitorEvent::Updated(update)) => {
                    let source = if update.is_fresh_fetch { "fetched" } else { "recalculated" };
                    info!(
                        "AQI {} ({}) for {}, {} from {} sensors [{source}]",
                        update.status_title,
                        update.result.category,
                        update.city,
                        update.region,
                        update.included_readings
                    );
                }
                Ok(MonitorEvent::UpdateFailed { message, error }) => {
                    warn!("{message} ({error})");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("event reporter fell behind, skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    monitor.start_auto_refresh().await;

    tokio::signal::ctrl_c()
        .await
        .context("could not listen for Ctrl-C")?;
    info!("got Ctrl-C, shutting down");

    monitor.shutdown().await;
    reporter.abort();
    Ok(())
}
