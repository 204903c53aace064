//! Sensor platform
//!
//! Keeps the registered camera sensors. Entities are added for every device
//! uid seen in a snapshot and are never removed; a device that disappears
//! simply reports its sensors as unavailable.

mod entity;

pub use self::entity::{CameraSensor, SensorKind, SensorView};

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::coordinator::UpdateCoordinator;

pub struct SensorPlatform {
    coordinator: Arc<UpdateCoordinator>,
    entities: RwLock<Vec<CameraSensor>>,
}

impl SensorPlatform {
    pub fn new(coordinator: Arc<UpdateCoordinator>) -> Self {
        Self {
            coordinator,
            entities: RwLock::new(Vec::new()),
        }
    }

    /// Register sensors for devices not seen before; returns how many were added
    pub async fn sync_entities(&self) -> usize {
        let state = self.coordinator.snapshot().await;
        let Some(devices) = state.data.as_ref() else {
            return 0;
        };

        let mut entities = self.entities.write().await;
        let mut known: HashSet<String> = entities
            .iter()
            .map(|e| e.device_uid().to_string())
            .collect();

        let before = entities.len();
        for device in devices {
            let Some(uid) = device.device_uid.as_deref() else {
                continue;
            };
            if !known.insert(uid.to_string()) {
                continue;
            }
            if let Some(sensors) = CameraSensor::for_device(device) {
                entities.extend(sensors);
            }
        }

        let added = entities.len() - before;
        if added > 0 {
            tracing::info!(
                "[Sensors] Added {} entities ({} total)",
                added,
                entities.len()
            );
        }
        added
    }

    pub async fn entity_count(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn views(&self) -> Vec<SensorView> {
        self.sync_entities().await;
        let state = self.coordinator.snapshot().await;
        let entities = self.entities.read().await;
        entities.iter().map(|e| e.view(&state)).collect()
    }

    pub async fn view(&self, unique_id: &str) -> Option<SensorView> {
        self.sync_entities().await;
        let state = self.coordinator.snapshot().await;
        let entities = self.entities.read().await;
        entities
            .iter()
            .find(|e| e.unique_id() == unique_id)
            .map(|e| e.view(&state))
    }

    pub async fn device_views(&self, device_uid: &str) -> Vec<SensorView> {
        self.sync_entities().await;
        let state = self.coordinator.snapshot().await;
        let entities = self.entities.read().await;
        entities
            .iter()
            .filter(|e| e.device_uid() == device_uid)
            .map(|e| e.view(&state))
            .collect()
    }
}
