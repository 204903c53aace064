//! Normalized device types

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Connectivity as reported by the portal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OnlineState {
    Online,
    Offline,
    /// Free-form state string from the legacy shape (e.g. "sleeping")
    Label(String),
    #[default]
    Unknown,
}

impl OnlineState {
    pub fn from_flag(online: bool) -> Self {
        if online {
            OnlineState::Online
        } else {
            OnlineState::Offline
        }
    }
}

impl Serialize for OnlineState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OnlineState::Online => serializer.serialize_bool(true),
            OnlineState::Offline => serializer.serialize_bool(false),
            OnlineState::Label(label) => serializer.serialize_str(label),
            OnlineState::Unknown => serializer.serialize_none(),
        }
    }
}

/// One camera from a device-list poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRecord {
    pub device_uid: Option<String>,
    pub name: String,
    pub online_state: OnlineState,
    pub battery: Option<f64>,
    pub is_battery_charging: Option<bool>,
    pub signal: Option<i64>,
    pub latest_active_utc: Option<DateTime<Utc>>,
}

impl DeviceRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            device_uid: None,
            name: name.into(),
            online_state: OnlineState::Unknown,
            battery: None,
            is_battery_charging: None,
            signal: None,
            latest_active_utc: None,
        }
    }
}
