use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::air_quality::{AqiResult, CorrectionModel};
use crate::geo::QUERY_RADIUS_METERS;
use crate::geocoding::LocationResolver;
use crate::models::{AveragingWindow, FilterSettings, Location};
use crate::sensors::SensorSource;

use super::{AqiUpdate, MonitorEvent, MonitorState, MonitorStatus, UpdateError, FAILURE_MESSAGE};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    pub status: MonitorStatus,
    pub postal_code: String,
    pub city: String,
    pub region: String,
    pub settings: FilterSettings,
    pub result: AqiResult,
    pub status_title: String,
    pub reading_count: usize,
    pub included_count: usize,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Owns the pipeline state and runs resolve → fetch → filter → convert.
///
/// Cheap to clone; clones share state, subscribers and the refresh task.
/// At most one update is live: starting another cancels the previous one,
/// and a cancelled update never writes state. Dropping the last clone stops
/// the refresh task and cancels the live update.
#[derive(Clone)]
pub struct AqiMonitor {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<MonitorState>,
    resolver: Arc<dyn LocationResolver>,
    sensors: Arc<dyn SensorSource>,
    events: broadcast::Sender<MonitorEvent>,
    generation: AtomicU64,
    in_flight: Mutex<Option<CancellationToken>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    refresh_interval: Duration,
    query_radius_meters: f64,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
        if let Some(token) = self.in_flight.get_mut().take() {
            token.cancel();
        }
    }
}

impl AqiMonitor {
    pub fn new(
        resolver: Arc<dyn LocationResolver>,
        sensors: Arc<dyn SensorSource>,
        postal_code: impl Into<String>,
        settings: FilterSettings,
        refresh_interval: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(MonitorState::new(postal_code, settings)),
                resolver,
                sensors,
                events,
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(None),
                ticker: Mutex::new(None),
                refresh_interval,
                query_radius_meters: QUERY_RADIUS_METERS,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.shared.events.subscribe()
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        let state = self.shared.state.lock().await;
        MonitorSnapshot {
            status: state.status,
            postal_code: state.location.postal_code.clone(),
            city: state.location.city_label().to_string(),
            region: state.location.region_label().to_string(),
            settings: state.settings,
            result: state.result.clone(),
            status_title: state.result.status_title(),
            reading_count: state.readings.len(),
            included_count: state.included_count,
            fetched_at: state.fetched_at,
            last_error: state.last_error.as_ref().map(ToString::to_string),
        }
    }

    pub async fn set_postal_code(&self, postal_code: &str) -> Result<AqiUpdate, UpdateError> {
        let postal_code = postal_code.trim().to_string();
        self.run_update(move |state| state.location = Location::new(postal_code))
            .await
    }

    pub async fn set_averaging_window(
        &self,
        window: AveragingWindow,
    ) -> Result<AqiUpdate, UpdateError> {
        self.run_update(move |state| state.settings.window = window)
            .await
    }

    /// Change the filter radius and recalculate over the cached readings.
    ///
    /// Out-of-range radii are clamped. The new radius is kept even when
    /// there is nothing to recalculate yet.
    pub async fn set_filter_radius(&self, radius_miles: f64) -> Result<AqiUpdate, UpdateError> {
        let radius_miles = FilterSettings::clamp_radius(radius_miles);
        self.recalculate_with(|state| state.settings.radius_miles = radius_miles)
            .await
    }

    pub async fn set_correction_model(
        &self,
        model: CorrectionModel,
    ) -> Result<AqiUpdate, UpdateError> {
        self.recalculate_with(|state| state.settings.correction = model)
            .await
    }

    /// Resolve the postal code, fetch sensors around it and publish a fresh index.
    ///
    /// Any failure resets the cached location, region, readings and result
    /// and publishes [`MonitorEvent::UpdateFailed`].
    pub async fn update_data(&self) -> Result<AqiUpdate, UpdateError> {
        self.run_update(|_| {}).await
    }

    /// Re-filter and re-convert the cached readings without touching the network.
    pub async fn recalculate(&self) -> Result<AqiUpdate, UpdateError> {
        self.recalculate_with(|_| {}).await
    }

    /// Run [`update_data`](Self::update_data) now and then every refresh interval.
    ///
    /// The task only holds a weak handle, so it ends once every clone of the
    /// monitor is gone.
    pub async fn start_auto_refresh(&self) {
        let mut ticker_guard = self.shared.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let shared = Arc::downgrade(&self.shared);
        let period = self.shared.refresh_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                let Some(monitor) = AqiMonitor::upgrade(&shared) else {
                    log_info!("monitor dropped, auto refresh stopping");
                    break;
                };
                // Detached so stopping the ticker never leaves an update half done.
                tokio::spawn(async move {
                    if let Err(err) = monitor.update_data().await {
                        log_warn!("scheduled refresh did not complete: {err}");
                    }
                });
            }
        });

        *ticker_guard = Some(handle);
    }

    pub async fn stop_auto_refresh(&self) {
        if let Some(handle) = self.shared.ticker.lock().await.take() {
            handle.abort();
        }
    }

    /// Stop refreshing and abandon any update still in flight.
    pub async fn shutdown(&self) {
        self.stop_auto_refresh().await;
        let mut in_flight = self.shared.in_flight.lock().await;
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = in_flight.take() {
            token.cancel();
        }
    }

    fn upgrade(shared: &Weak<Shared>) -> Option<Self> {
        shared.upgrade().map(|shared| Self { shared })
    }

    async fn run_update(
        &self,
        apply: impl FnOnce(&mut MonitorState) + Send,
    ) -> Result<AqiUpdate, UpdateError> {
        let (generation, token) = self.begin_attempt(apply).await;
        let outcome = self.run_attempt(generation, &token).await;
        self.finish_attempt(generation).await;

        match outcome {
            Err(UpdateError::Superseded) => {
                log_info!("update #{generation} superseded");
                Err(UpdateError::Superseded)
            }
            Err(err) => {
                self.fail(generation, err.clone()).await;
                Err(err)
            }
            ok => ok,
        }
    }

    async fn recalculate_with(
        &self,
        apply: impl FnOnce(&mut MonitorState),
    ) -> Result<AqiUpdate, UpdateError> {
        let mut state = self.shared.state.lock().await;
        apply(&mut *state);
        let update = state.recalculate(false)?;
        self.publish(MonitorEvent::Updated(update.clone()));
        Ok(update)
    }

    /// Supersede the live attempt, then apply the new input.
    ///
    /// Inputs land in call order and only after the previous attempt can no
    /// longer write state. Lock order is `in_flight` then `state`.
    async fn begin_attempt(
        &self,
        apply: impl FnOnce(&mut MonitorState),
    ) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let mut in_flight = self.shared.in_flight.lock().await;
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = in_flight.replace(token.clone()) {
            previous.cancel();
        }
        apply(&mut *self.shared.state.lock().await);
        (generation, token)
    }

    async fn finish_attempt(&self, generation: u64) {
        let mut in_flight = self.shared.in_flight.lock().await;
        if self.is_current(generation) {
            in_flight.take();
        }
    }

    async fn run_attempt(
        &self,
        generation: u64,
        token: &CancellationToken,
    ) -> Result<AqiUpdate, UpdateError> {
        let shared = &self.shared;
        let postal_code = {
            let mut state = shared.state.lock().await;
            self.ensure_current(generation)?;
            state.begin_resolving()
        };
        log_info!("update #{generation}: resolving postal code {postal_code}");

        let resolved = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(UpdateError::Superseded),
            resolved = shared.resolver.resolve(&postal_code) => resolved?,
        };

        let (region, window) = {
            let mut state = shared.state.lock().await;
            self.ensure_current(generation)?;
            let region = state.apply_location(resolved, shared.query_radius_meters);
            state.begin_fetching();
            (region, state.settings.window)
        };

        let readings = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(UpdateError::Superseded),
            readings = shared.sensors.fetch_readings(&region, window) => readings?,
        };

        let mut state = shared.state.lock().await;
        self.ensure_current(generation)?;
        log_info!(
            "update #{generation}: {} readings for {} ({window})",
            readings.len(),
            state.location.postal_code
        );
        state.store_readings(readings, Utc::now());
        let update = state.recalculate(true)?;
        // Published under the lock so events keep the order of state changes.
        self.publish(MonitorEvent::Updated(update.clone()));
        Ok(update)
    }

    async fn fail(&self, generation: u64, error: UpdateError) {
        let mut state = self.shared.state.lock().await;
        if !self.is_current(generation) {
            return;
        }
        log_error!(
            "update #{generation} for {} failed: {error}",
            state.location.postal_code
        );
        state.fail(error.clone());
        self.publish(MonitorEvent::UpdateFailed {
            message: FAILURE_MESSAGE,
            error,
        });
        state.reset();
    }

    fn is_current(&self, generation: u64) -> bool {
        self.shared.generation.load(Ordering::SeqCst) == generation
    }

    fn ensure_current(&self, generation: u64) -> Result<(), UpdateError> {
        if self.is_current(generation) {
            Ok(())
        } else {
            Err(UpdateError::Superseded)
        }
    }

    fn publish(&self, event: MonitorEvent) {
        // No subscribers is fine.
        let _ = self.shared.events.send(event);
    }
}
