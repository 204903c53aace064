//! Device-list response normalization
//!
//! The portal has answered with two layouts over time:
//! - v2: `{"code": 0, "data": {"infos": [{"device_name", "dynamic_info": {..}}]}}`
//! - legacy: `{"devices": [{"device_uid", "name", "online_state", ..}]}`
//!
//! Both are mapped onto [`DeviceRecord`]. Bad individual fields are dropped
//! with a warning instead of failing the poll.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use super::models::{DeviceRecord, OnlineState};

/// Last accepted epoch second (9999-12-31T23:59:59Z); larger values are
/// usually milliseconds
const MAX_EPOCH_SECS: f64 = 253_402_300_799.0;

/// v2 reports signal as bars (0..=5); scaled to a 0..=100 figure
const SIGNAL_BAR_SCALE: i64 = 20;

/// v2 `online_state` value meaning "connected"
const V2_ONLINE: &str = "2";

/// Map a raw device-list body onto normalized records
pub fn normalize_device_list(raw: &Value) -> Vec<DeviceRecord> {
    if let Some(infos) = raw
        .get("data")
        .and_then(|d| d.get("infos"))
        .and_then(|i| i.as_array())
    {
        return infos.iter().map(normalize_v2_entry).collect();
    }

    if let Some(devices) = raw.get("devices").and_then(|d| d.as_array()) {
        return devices.iter().map(normalize_legacy_entry).collect();
    }

    tracing::debug!("[Ubox] Device list response has no recognizable device array");
    Vec::new()
}

fn normalize_v2_entry(device: &Value) -> DeviceRecord {
    let name = device
        .get("device_name")
        .and_then(value_as_string)
        .unwrap_or_else(|| "Unknown".to_string());

    let Some(info) = device.get("dynamic_info").filter(|v| v.is_object()) else {
        tracing::warn!("[Ubox] Device '{}' has no dynamic_info", name);
        return DeviceRecord::named(name);
    };

    let online = info
        .get("online_state")
        .and_then(value_as_string)
        .map(|s| s == V2_ONLINE)
        .unwrap_or(false);

    DeviceRecord {
        device_uid: info.get("device_uid").and_then(value_as_string),
        name,
        online_state: OnlineState::from_flag(online),
        battery: info.get("battery").and_then(value_as_f64),
        is_battery_charging: info.get("is_battery_charging").and_then(value_as_bool),
        signal: info.get("signal").and_then(parse_signal_bars),
        latest_active_utc: info.get("latest_active_utc").and_then(parse_epoch),
    }
}

fn normalize_legacy_entry(device: &Value) -> DeviceRecord {
    let device_uid = device.get("device_uid").and_then(value_as_string);
    let name = device
        .get("name")
        .and_then(value_as_string)
        .unwrap_or_else(|| format!("Camera {}", device_uid.as_deref().unwrap_or("Unknown")));

    let online_state = match device.get("online_state") {
        Some(Value::Bool(b)) => OnlineState::from_flag(*b),
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "online" => OnlineState::Online,
            "offline" => OnlineState::Offline,
            _ => OnlineState::Label(s.clone()),
        },
        _ => OnlineState::Unknown,
    };

    DeviceRecord {
        device_uid,
        name,
        online_state,
        battery: device.get("battery").and_then(value_as_f64),
        is_battery_charging: device.get("is_battery_charging").and_then(value_as_bool),
        signal: device.get("signal").and_then(value_as_i64),
        latest_active_utc: device.get("latest_active_utc").and_then(parse_iso),
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_signal_bars(value: &Value) -> Option<i64> {
    if value.is_null() {
        return None;
    }
    let scaled = value_as_i64(value).and_then(|bars| bars.checked_mul(SIGNAL_BAR_SCALE));
    if scaled.is_none() {
        tracing::warn!("[Ubox] Could not parse signal: {}", value);
    }
    scaled
}

fn parse_epoch(value: &Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return None,
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    let parsed = match secs {
        Some(s) if s == 0.0 => return None,
        Some(s) if s.is_finite() && s.abs() <= MAX_EPOCH_SECS => {
            DateTime::from_timestamp(s.trunc() as i64, (s.fract() * 1e9) as u32)
        }
        _ => None,
    };

    if parsed.is_none() {
        tracing::warn!("[Ubox] Could not parse timestamp: {}", value);
    }
    parsed
}

fn parse_iso(value: &Value) -> Option<DateTime<Utc>> {
    let raw = match value {
        Value::String(s) if !s.trim().is_empty() => s.trim(),
        Value::Null => return None,
        Value::String(_) => return None,
        other => {
            tracing::warn!("[Ubox] Could not parse timestamp: {}", other);
            return None;
        }
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // Offset-less timestamps are taken as UTC
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    tracing::warn!("[Ubox] Could not parse timestamp: {}", raw);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_v2_shape() {
        let raw = json!({
            "code": 0,
            "data": {
                "infos": [{
                    "device_name": "Front Door",
                    "dynamic_info": {
                        "device_uid": "UBX123",
                        "online_state": "2",
                        "battery": 87,
                        "is_battery_charging": false,
                        "signal": "4",
                        "latest_active_utc": 1700000000
                    }
                }]
            }
        });

        let devices = normalize_device_list(&raw);
        assert_eq!(devices.len(), 1);
        let d = &devices[0];
        assert_eq!(d.device_uid.as_deref(), Some("UBX123"));
        assert_eq!(d.name, "Front Door");
        assert_eq!(d.online_state, OnlineState::Online);
        assert_eq!(d.battery, Some(87.0));
        assert_eq!(d.is_battery_charging, Some(false));
        assert_eq!(d.signal, Some(80));
        assert_eq!(
            d.latest_active_utc,
            Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );
    }

    #[test]
    fn test_v2_offline_and_numeric_state() {
        let raw = json!({
            "data": {"infos": [
                {"device_name": "A", "dynamic_info": {"device_uid": "A1", "online_state": "1"}},
                {"device_name": "B", "dynamic_info": {"device_uid": "B1", "online_state": 2}}
            ]}
        });
        let devices = normalize_device_list(&raw);
        assert_eq!(devices[0].online_state, OnlineState::Offline);
        assert_eq!(devices[1].online_state, OnlineState::Online);
    }

    #[test]
    fn test_v2_defaults_and_bad_fields() {
        let raw = json!({
            "data": {"infos": [{
                "dynamic_info": {
                    "device_uid": "X",
                    "signal": "strong",
                    "latest_active_utc": "yesterday",
                    "is_battery_charging": 1
                }
            }]}
        });
        let devices = normalize_device_list(&raw);
        let d = &devices[0];
        assert_eq!(d.name, "Unknown");
        assert_eq!(d.signal, None);
        assert_eq!(d.latest_active_utc, None);
        assert_eq!(d.is_battery_charging, Some(true));
        assert_eq!(d.online_state, OnlineState::Offline);
    }

    #[test]
    fn test_v2_oversized_signal_dropped() {
        let raw = json!({
            "data": {"infos": [
                {"dynamic_info": {"device_uid": "A", "signal": "922337203685477580"}},
                {"dynamic_info": {"device_uid": "B", "signal": i64::MAX}},
                {"dynamic_info": {"device_uid": "C", "signal": 5}}
            ]}
        });
        let devices = normalize_device_list(&raw);
        assert_eq!(devices[0].signal, None);
        assert_eq!(devices[1].signal, None);
        assert_eq!(devices[2].signal, Some(100));
    }

    #[test]
    fn test_v2_millisecond_timestamp_dropped() {
        let raw = json!({
            "data": {"infos": [
                {"dynamic_info": {"device_uid": "A", "latest_active_utc": 1_700_000_000_000i64}},
                {"dynamic_info": {"device_uid": "B", "latest_active_utc": "253402300799"}}
            ]}
        });
        let devices = normalize_device_list(&raw);
        assert_eq!(devices[0].latest_active_utc, None);
        assert_eq!(
            devices[1].latest_active_utc,
            Some(Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_v2_zero_timestamp_is_absent() {
        let raw = json!({
            "data": {"infos": [{"dynamic_info": {"device_uid": "X", "latest_active_utc": 0}}]}
        });
        assert_eq!(normalize_device_list(&raw)[0].latest_active_utc, None);
    }

    #[test]
    fn test_v2_missing_dynamic_info() {
        let raw = json!({"data": {"infos": [{"device_name": "Garage"}]}});
        let devices = normalize_device_list(&raw);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_uid, None);
        assert_eq!(devices[0].name, "Garage");
        assert_eq!(devices[0].online_state, OnlineState::Unknown);
    }

    #[test]
    fn test_legacy_shape() {
        let raw = json!({
            "devices": [{
                "device_uid": "LEG1",
                "name": "Backyard",
                "online_state": "sleeping",
                "battery": "55",
                "is_battery_charging": true,
                "signal": -67,
                "latest_active_utc": "2024-03-01T12:30:00Z"
            }]
        });
        let devices = normalize_device_list(&raw);
        let d = &devices[0];
        assert_eq!(d.device_uid.as_deref(), Some("LEG1"));
        assert_eq!(d.name, "Backyard");
        assert_eq!(d.online_state, OnlineState::Label("sleeping".to_string()));
        assert_eq!(d.battery, Some(55.0));
        assert_eq!(d.is_battery_charging, Some(true));
        assert_eq!(d.signal, Some(-67));
        assert_eq!(
            d.latest_active_utc,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_legacy_default_name_and_bad_timestamp() {
        let raw = json!({
            "devices": [
                {"device_uid": "LEG2", "online_state": false, "latest_active_utc": "not a date"},
                {"online_state": "Online"}
            ]
        });
        let devices = normalize_device_list(&raw);
        assert_eq!(devices[0].name, "Camera LEG2");
        assert_eq!(devices[0].online_state, OnlineState::Offline);
        assert_eq!(devices[0].latest_active_utc, None);
        assert_eq!(devices[1].name, "Camera Unknown");
        assert_eq!(devices[1].online_state, OnlineState::Online);
    }

    #[test]
    fn test_legacy_naive_timestamp_is_utc() {
        let raw = json!({"devices": [{"device_uid": "N", "latest_active_utc": "2024-01-02T03:04:05"}]});
        assert_eq!(
            normalize_device_list(&raw)[0].latest_active_utc,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
        );
    }

    #[test]
    fn test_unrecognized_body() {
        assert!(normalize_device_list(&json!({"code": 0, "msg": "ok"})).is_empty());
        assert!(normalize_device_list(&json!({"data": null})).is_empty());
    }
}
