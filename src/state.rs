//! Shared application state

use std::sync::Arc;

use crate::config::UboxConfig;
use crate::coordinator::UpdateCoordinator;
use crate::sensors::SensorPlatform;

/// State handed to every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<UpdateCoordinator>,
    pub sensors: Arc<SensorPlatform>,
    /// Endpoints and client identity used when validating new credentials
    pub ubox_template: Arc<UboxConfig>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(coordinator: Arc<UpdateCoordinator>, ubox_template: UboxConfig) -> Self {
        let sensors = Arc::new(SensorPlatform::new(coordinator.clone()));
        Self {
            coordinator,
            sensors,
            ubox_template: Arc::new(ubox_template),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
