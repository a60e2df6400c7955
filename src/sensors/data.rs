//! Data structures for sensor readings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a sensor device, taken from its directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of quantity a reading carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Degrees Celsius
    Temperature,
}

/// One sampled value from one device.
///
/// Serializes as `{"sensorid": ..., "type": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Device the value was read from
    #[serde(rename = "sensorid")]
    pub device_id: DeviceId,
    /// What the value measures
    #[serde(rename = "type")]
    pub kind: SensorKind,
    /// Raw value as read from the device
    pub value: f64,
}

impl Reading {
    /// Create a temperature reading in degrees Celsius.
    pub fn temperature(device_id: DeviceId, value: f64) -> Self {
        Self {
            device_id,
            kind: SensorKind::Temperature,
            value,
        }
    }
}

/// Devices found by discovery, in filesystem enumeration order.
///
/// Fixed once discovery completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList(Vec<DeviceId>);

impl DeviceList {
    pub fn iter(&self) -> std::slice::Iter<'_, DeviceId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|d| d.as_str() == id)
    }
}

impl FromIterator<DeviceId> for DeviceList {
    fn from_iter<I: IntoIterator<Item = DeviceId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DeviceList {
    type Item = &'a DeviceId;
    type IntoIter = std::slice::Iter<'a, DeviceId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
