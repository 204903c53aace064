//! Camera sensor entities
//!
//! Each camera gets one read-only sensor per [`SensorKind`]. Sensors hold no
//! data of their own; every read projects a field out of the coordinator's
//! current snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coordinator::CoordinatorState;
use crate::ubox::{DeviceRecord, OnlineState};

pub const DOMAIN: &str = "ubox-camera-ha";
pub const MANUFACTURER: &str = "Ubia";
pub const MODEL: &str = "Camera";
const SW_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Battery,
    SignalStrength,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    OnlineState,
    Battery,
    IsBatteryCharging,
    Signal,
    LatestActiveUtc,
}

/// Static presentation data for a sensor kind
#[derive(Debug, Clone, Copy)]
pub struct SensorDescriptor {
    pub name: &'static str,
    pub icon: &'static str,
    pub device_class: Option<DeviceClass>,
    pub unit: Option<&'static str>,
}

impl SensorKind {
    pub const ALL: [SensorKind; 5] = [
        SensorKind::OnlineState,
        SensorKind::Battery,
        SensorKind::IsBatteryCharging,
        SensorKind::Signal,
        SensorKind::LatestActiveUtc,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SensorKind::OnlineState => "online_state",
            SensorKind::Battery => "battery",
            SensorKind::IsBatteryCharging => "is_battery_charging",
            SensorKind::Signal => "signal",
            SensorKind::LatestActiveUtc => "latest_active_utc",
        }
    }

    pub fn descriptor(&self) -> SensorDescriptor {
        match self {
            SensorKind::OnlineState => SensorDescriptor {
                name: "Online State",
                icon: "mdi:wifi",
                device_class: None,
                unit: None,
            },
            SensorKind::Battery => SensorDescriptor {
                name: "Battery",
                icon: "mdi:battery",
                device_class: Some(DeviceClass::Battery),
                unit: Some("%"),
            },
            SensorKind::IsBatteryCharging => SensorDescriptor {
                name: "Battery Charging",
                icon: "mdi:battery-charging",
                device_class: None,
                unit: None,
            },
            // Unit fits the v2 bar scale; legacy payloads carry the
            // portal's raw reading, which is reported unchanged
            SensorKind::Signal => SensorDescriptor {
                name: "Signal Strength",
                icon: "mdi:signal",
                device_class: Some(DeviceClass::SignalStrength),
                unit: Some("%"),
            },
            SensorKind::LatestActiveUtc => SensorDescriptor {
                name: "Last Active",
                icon: "mdi:clock-outline",
                device_class: Some(DeviceClass::Timestamp),
                unit: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub sw_version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorAttributes {
    pub device_uid: String,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Full read-out of one sensor
#[derive(Debug, Clone, Serialize)]
pub struct SensorView {
    pub unique_id: String,
    pub name: String,
    pub kind: SensorKind,
    pub icon: &'static str,
    pub device_class: Option<DeviceClass>,
    pub unit_of_measurement: Option<&'static str>,
    pub state: Option<SensorValue>,
    pub available: bool,
    pub attributes: Option<SensorAttributes>,
    pub device: DeviceInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraSensor {
    device_uid: String,
    device_name: String,
    kind: SensorKind,
}

impl CameraSensor {
    pub fn new(device_uid: &str, device_name: &str, kind: SensorKind) -> Self {
        Self {
            device_uid: device_uid.to_string(),
            device_name: device_name.to_string(),
            kind,
        }
    }

    /// One sensor per kind for a device; `None` for devices without uid
    pub fn for_device(device: &DeviceRecord) -> Option<Vec<Self>> {
        let uid = device.device_uid.as_deref()?;
        let name = if device.name.is_empty() {
            format!("Camera {}", uid)
        } else {
            device.name.clone()
        };
        Some(
            SensorKind::ALL
                .iter()
                .map(|kind| Self::new(uid, &name, *kind))
                .collect(),
        )
    }

    pub fn device_uid(&self) -> &str {
        &self.device_uid
    }

    pub fn unique_id(&self) -> String {
        format!("{}_{}", self.device_uid, self.kind.key())
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.device_name, self.kind.descriptor().name)
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifiers: vec![(DOMAIN.to_string(), self.device_uid.clone())],
            name: self.device_name.clone(),
            manufacturer: MANUFACTURER,
            model: MODEL,
            sw_version: SW_VERSION,
        }
    }

    pub fn native_value(&self, state: &CoordinatorState) -> Option<SensorValue> {
        let device = state.device(&self.device_uid)?;

        match self.kind {
            SensorKind::OnlineState => Some(SensorValue::Text(match &device.online_state {
                OnlineState::Online => "Online".to_string(),
                OnlineState::Offline => "Offline".to_string(),
                OnlineState::Label(label) => title_case(label),
                OnlineState::Unknown => "Unknown".to_string(),
            })),
            SensorKind::IsBatteryCharging => Some(SensorValue::Text(
                match device.is_battery_charging {
                    Some(true) => "Charging",
                    Some(false) => "Not Charging",
                    None => "Unknown",
                }
                .to_string(),
            )),
            SensorKind::LatestActiveUtc => device.latest_active_utc.map(SensorValue::Timestamp),
            SensorKind::Battery => device
                .battery
                .filter(|b| b.is_finite())
                .map(|b| SensorValue::Number(b.clamp(0.0, 100.0))),
            SensorKind::Signal => device.signal.map(SensorValue::Integer),
        }
    }

    pub fn available(&self, state: &CoordinatorState) -> bool {
        state.last_update_success && self.native_value(state).is_some()
    }

    pub fn extra_state_attributes(&self, state: &CoordinatorState) -> Option<SensorAttributes> {
        state.device(&self.device_uid)?;
        Some(SensorAttributes {
            device_uid: self.device_uid.clone(),
            last_updated: state.last_update_success_time,
        })
    }

    pub fn view(&self, state: &CoordinatorState) -> SensorView {
        let descriptor = self.kind.descriptor();
        SensorView {
            unique_id: self.unique_id(),
            name: self.name(),
            kind: self.kind,
            icon: descriptor.icon,
            device_class: descriptor.device_class,
            unit_of_measurement: descriptor.unit,
            state: self.native_value(state),
            available: self.available(state),
            attributes: self.extra_state_attributes(state),
            device: self.device_info(),
        }
    }
}

/// Capitalize the first letter of every word, lowercase the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
