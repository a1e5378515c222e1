// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Canonical traffic records

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ubus::Device;
use crate::units::{format_size, format_speed};

/// Display name of the network-wide record
pub const NETWORK_TOTAL_NAME: &str = "network total";

/// Traffic counters extracted from one metric row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    /// Instantaneous download rate (bytes/s)
    pub down_speed: u64,
    /// Instantaneous upload rate (bytes/s)
    pub up_speed: u64,
    /// Cumulative bytes downloaded
    pub total_down: u64,
    /// Cumulative bytes uploaded
    pub total_up: u64,
}

/// Traffic of one subject, ready for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub device_name: String,
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    pub down_speed: u64,
    pub up_speed: u64,
    pub total_down: u64,
    pub total_up: u64,
    pub down_speed_human: String,
    pub up_speed_human: String,
    pub total_down_human: String,
    pub total_up_human: String,
}

impl TrafficRecord {
    fn new(device_name: String, ip: String, mac: Option<String>, counters: Counters) -> Self {
        Self {
            device_name,
            ip,
            mac,
            down_speed: counters.down_speed,
            up_speed: counters.up_speed,
            total_down: counters.total_down,
            total_up: counters.total_up,
            down_speed_human: format_speed(counters.down_speed),
            up_speed_human: format_speed(counters.up_speed),
            total_down_human: format_size(counters.total_down),
            total_up_human: format_size(counters.total_up),
        }
    }

    /// Record for the whole network
    #[must_use]
    pub fn network_total(counters: Counters) -> Self {
        Self::new(NETWORK_TOTAL_NAME.to_string(), "-".to_string(), None, counters)
    }

    /// Record for a single device
    #[must_use]
    pub fn for_device(device: &Device, counters: Counters) -> Self {
        Self::new(
            device.hostname.clone(),
            device.ip.clone(),
            Some(device.mac.clone()),
            counters,
        )
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        Counters {
            down_speed: self.down_speed,
            up_speed: self.up_speed,
            total_down: self.total_down,
            total_up: self.total_up,
        }
    }
}

/// Network total plus per-device records of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub devices: Vec<TrafficRecord>,
    #[serde(
        default,
        serialize_with = "serialize_total",
        deserialize_with = "deserialize_total"
    )]
    pub total: Option<TrafficRecord>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TotalRepr {
    Record(TrafficRecord),
    Empty {},
}

/// An absent total is written as `{}`
fn serialize_total<S: Serializer>(
    total: &Option<TrafficRecord>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match total {
        Some(record) => record.serialize(serializer),
        None => TotalRepr::Empty {}.serialize(serializer),
    }
}

/// Accepts a record, `{}` or `null`
fn deserialize_total<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TrafficRecord>, D::Error> {
    Ok(match Option::<TotalRepr>::deserialize(deserializer)? {
        Some(TotalRepr::Record(record)) => Some(record),
        Some(TotalRepr::Empty {}) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn counters() -> Counters {
        Counters {
            down_speed: 1536,
            up_speed: 0,
            total_down: 5 * 1024 * 1024,
            total_up: 1024,
        }
    }

    fn laptop() -> Device {
        Device {
            mac: "aa:bb:cc:dd:ee:ff".to_string(),
            hostname: "laptop".to_string(),
            ip: "10.0.0.10".to_string(),
        }
    }

    #[test]
    fn test_network_total_record() {
        let record = TrafficRecord::network_total(counters());

        assert_eq!(record.device_name, "network total");
        assert_eq!(record.ip, "-");
        assert!(record.mac.is_none());
        assert_eq!(record.down_speed_human, "1.50 KB/s");
        assert_eq!(record.up_speed_human, "0 B/s");
        assert_eq!(record.total_down_human, "5.00 MB");
        assert_eq!(record.total_up_human, "1.00 KB");
        assert_eq!(record.counters(), counters());
    }

    #[test]
    fn test_device_record_carries_identity() {
        let record = TrafficRecord::for_device(&laptop(), counters());

        assert_eq!(record.device_name, "laptop");
        assert_eq!(record.ip, "10.0.0.10");
        assert_eq!(record.mac.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_total_record_omits_mac_in_json() {
        let value = serde_json::to_value(TrafficRecord::network_total(counters())).unwrap();
        assert!(value.get("mac").is_none());
        assert_eq!(value["device_name"], "network total");
    }

    #[test]
    fn test_empty_total_serializes_as_empty_object() {
        let set = ResultSet::default();
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value, json!({"devices": [], "total": {}}));
    }

    #[test]
    fn test_result_set_json_roundtrip_preserves_counters() {
        let big = Counters {
            down_speed: 987_654_321,
            up_speed: 123_456_789,
            total_down: 9_007_199_254_740_993,
            total_up: u64::MAX,
        };
        let set = ResultSet {
            devices: vec![TrafficRecord::for_device(&laptop(), big)],
            total: Some(TrafficRecord::network_total(counters())),
        };

        let text = serde_json::to_string_pretty(&set).unwrap();
        let parsed: ResultSet = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed, set);
        assert_eq!(parsed.devices[0].counters(), big);
    }

    #[test]
    fn test_result_set_accepts_null_or_missing_total() {
        let parsed: ResultSet = serde_json::from_str(r#"{"devices": [], "total": null}"#).unwrap();
        assert!(parsed.total.is_none());

        let parsed: ResultSet = serde_json::from_str(r#"{"devices": []}"#).unwrap();
        assert!(parsed.total.is_none());

        let parsed: ResultSet = serde_json::from_str(r#"{"devices": [], "total": {}}"#).unwrap();
        assert!(parsed.total.is_none());
    }
}
