// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Type definitions for bandix inventory data

use std::collections::HashSet;

use serde_json::Value;

/// Wire value of the network-wide subject
pub const NETWORK_SUBJECT: &str = "all";

/// Entity traffic is requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Aggregate traffic of the whole network
    Network,
    /// A single device, identified by MAC
    Device(String),
}

impl Subject {
    /// Value sent as the `mac` argument of `getMetrics`
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Network => NETWORK_SUBJECT,
            Self::Device(mac) => mac,
        }
    }
}

/// Device known to the bandix service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub mac: String,
    pub hostname: String,
    pub ip: String,
}

impl Device {
    /// Parses one entry of the `devices` array.
    ///
    /// Returns `None` when the entry has no string `mac`.
    fn from_value(value: &Value) -> Option<Self> {
        let mac = value.get("mac")?.as_str()?.to_string();
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Some(Self {
            hostname: text("hostname"),
            ip: text("ip"),
            mac,
        })
    }
}

/// Devices reported by `getStatus`, in router order and unique by MAC
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInventory {
    devices: Vec<Device>,
}

impl DeviceInventory {
    /// Builds an inventory, keeping the first occurrence of each MAC
    #[must_use]
    pub fn new(devices: impl IntoIterator<Item = Device>) -> Self {
        let mut seen = HashSet::new();
        let devices = devices
            .into_iter()
            .filter(|d| {
                let fresh = seen.insert(d.mac.clone());
                if !fresh {
                    tracing::debug!("Ignoring duplicate inventory entry for {}", d.mac);
                }
                fresh
            })
            .collect();
        Self { devices }
    }

    /// Parses the `getStatus` payload.
    ///
    /// A payload without a `devices` array yields an empty inventory.
    #[must_use]
    pub fn from_status(payload: &Value) -> Self {
        let Some(entries) = payload.get("devices").and_then(Value::as_array) else {
            tracing::debug!("Status payload carries no devices array");
            return Self::default();
        };
        Self::new(entries.iter().filter_map(|entry| {
            let device = Device::from_value(entry);
            if device.is_none() {
                tracing::warn!("Skipping inventory entry without MAC: {}", entry);
            }
            device
        }))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
