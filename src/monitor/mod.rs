//! The stateful part of the pipeline: resolves, fetches, caches, converts
//! and tells subscribers about it.

pub mod controller;
pub mod state;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::air_quality::AqiResult;
use crate::geocoding::ResolveError;
use crate::sensors::FetchError;

pub use controller::{AqiMonitor, MonitorSnapshot};
pub use state::{MonitorState, MonitorStatus};

/// Text shown to people when a refresh fails, whatever the cause.
pub const FAILURE_MESSAGE: &str = "Update failed, retrying shortly";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpdateError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// A newer update started, or the monitor shut down, before this one finished.
    #[error("update superseded by a newer request")]
    Superseded,
    #[error("no completed fetch to recalculate from")]
    NotReady,
}

/// Payload published after every successful calculation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AqiUpdate {
    pub result: AqiResult,
    pub status_title: String,
    pub postal_code: String,
    pub city: String,
    pub region: String,
    /// True when the update came with new sensor data, false for a
    /// recalculation over the cached readings.
    pub is_fresh_fetch: bool,
    pub included_readings: usize,
    pub average_concentration: Option<f32>,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    Updated(AqiUpdate),
    UpdateFailed {
        message: &'static str,
        error: UpdateError,
    },
}
