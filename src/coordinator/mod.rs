//! UpdateCoordinator: periodic device-list refresh
//!
//! Runs in a background tokio task. Every scan interval it fetches the device
//! list and replaces the cached snapshot. A failed poll keeps the previous
//! snapshot and marks the coordinator as unsuccessful until the next success.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};

use crate::notify::DiscordNotifier;
use crate::ubox::{DeviceRecord, UboxClient, UboxError};

/// Anything that can produce a device snapshot
#[async_trait]
pub trait DeviceSource: Send + Sync {
    /// Account label used in logs and notifications
    fn account(&self) -> &str;

    async fn fetch_devices(&self) -> Result<Vec<DeviceRecord>, UboxError>;
}

#[async_trait]
impl DeviceSource for UboxClient {
    fn account(&self) -> &str {
        self.username()
    }

    async fn fetch_devices(&self) -> Result<Vec<DeviceRecord>, UboxError> {
        self.get_device_list().await
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    /// Snapshot from the last successful poll, `None` until the first one
    pub data: Option<Vec<DeviceRecord>>,
    pub last_update_success: bool,
    pub last_update_success_time: Option<DateTime<Utc>>,
    pub last_attempt_time: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl CoordinatorState {
    pub fn device(&self, device_uid: &str) -> Option<&DeviceRecord> {
        self.data
            .as_ref()?
            .iter()
            .find(|d| d.device_uid.as_deref() == Some(device_uid))
    }
}

/// Coordinator state as reported over the API
#[derive(Debug, Serialize)]
pub struct CoordinatorStatus {
    pub account: String,
    pub last_update_success: bool,
    pub last_update_success_time: Option<DateTime<Utc>>,
    pub last_attempt_time: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub device_count: usize,
    pub scan_interval_secs: u64,
}

pub struct UpdateCoordinator {
    source: Arc<dyn DeviceSource>,
    state: RwLock<CoordinatorState>,
    scan_interval: Duration,
    failure_threshold: u32,
    notifier: Arc<DiscordNotifier>,
}

impl UpdateCoordinator {
    pub fn new(
        source: Arc<dyn DeviceSource>,
        scan_interval: Duration,
        failure_threshold: u32,
        notifier: Arc<DiscordNotifier>,
    ) -> Self {
        Self {
            source,
            state: RwLock::new(CoordinatorState::default()),
            scan_interval,
            failure_threshold: failure_threshold.max(1),
            notifier,
        }
    }

    /// Initial refresh before entities are set up
    pub async fn first_refresh(&self) -> Result<usize, UboxError> {
        let result = self.refresh().await;
        match &result {
            Ok(count) => tracing::info!("[Coordinator] Initial refresh: {} devices", count),
            Err(e) => tracing::warn!(
                "[Coordinator] Initial refresh failed (will retry in {}s): {}",
                self.scan_interval.as_secs(),
                e
            ),
        }
        result
    }

    /// Start the background refresh loop (runs forever)
    pub async fn start(self: Arc<Self>) {
        tracing::info!(
            "[Coordinator] Starting background refresh (interval: {}s)",
            self.scan_interval.as_secs()
        );

        let mut timer = interval(self.scan_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately; the initial refresh already ran
        timer.tick().await;

        loop {
            timer.tick().await;
            let _ = self.refresh().await;
        }
    }

    /// Poll once and update the cached snapshot
    pub async fn refresh(&self) -> Result<usize, UboxError> {
        let result = self.source.fetch_devices().await;
        let now = Utc::now();

        match result {
            Ok(devices) => {
                let count = devices.len();
                let recovered = {
                    let mut state = self.state.write().await;
                    let recovered = state.consecutive_failures >= self.failure_threshold;
                    state.data = Some(devices);
                    state.last_update_success = true;
                    state.last_update_success_time = Some(now);
                    state.last_attempt_time = Some(now);
                    state.last_error = None;
                    state.consecutive_failures = 0;
                    recovered
                };

                tracing::debug!("[Coordinator] Refreshed: {} devices", count);

                if recovered {
                    tracing::info!("[Coordinator] Polling recovered for {}", self.source.account());
                    self.notifier
                        .notify_poll_recovery(self.source.account(), count)
                        .await;
                }

                Ok(count)
            }
            Err(e) => {
                let failures = {
                    let mut state = self.state.write().await;
                    state.last_update_success = false;
                    state.last_attempt_time = Some(now);
                    state.last_error = Some(e.to_string());
                    state.consecutive_failures += 1;
                    state.consecutive_failures
                };

                tracing::warn!(
                    "[Coordinator] Refresh failed for {}: {} (consecutive failures = {})",
                    self.source.account(),
                    e,
                    failures
                );

                if failures == self.failure_threshold {
                    self.notifier
                        .notify_poll_failure(self.source.account(), failures, &e.to_string())
                        .await;
                }

                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> CoordinatorState {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> CoordinatorStatus {
        let state = self.state.read().await;
        CoordinatorStatus {
            account: self.source.account().to_string(),
            last_update_success: state.last_update_success,
            last_update_success_time: state.last_update_success_time,
            last_attempt_time: state.last_attempt_time,
            last_error: state.last_error.clone(),
            consecutive_failures: state.consecutive_failures,
            device_count: state.data.as_ref().map(Vec::len).unwrap_or(0),
            scan_interval_secs: self.scan_interval.as_secs(),
        }
    }
}
