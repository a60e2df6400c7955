//! Reading raw sample values from device files.

use crate::error::ReadError;
use crate::sensors::data::DeviceId;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-device file holding the current temperature.
pub const TEMPERATURE_FILE: &str = "temperature";

/// Source of raw sensor values.
///
/// The sampling loop only talks to this trait, so tests can swap the
/// filesystem for scripted values.
pub trait SensorSource: Send + Sync {
    /// Read the current value of one device.
    fn read(&self, device_id: &DeviceId) -> Result<f64, ReadError>;
}

/// Path of a device's temperature file below `root`.
pub fn temperature_file_path(root: &Path, device_id: &DeviceId) -> PathBuf {
    root.join(device_id.as_str()).join(TEMPERATURE_FILE)
}

/// Reads temperatures from an owfs-style mount.
#[derive(Debug, Clone)]
pub struct OneWireReader {
    root: PathBuf,
}

impl OneWireReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SensorSource for OneWireReader {
    fn read(&self, device_id: &DeviceId) -> Result<f64, ReadError> {
        let path = temperature_file_path(&self.root, device_id);
        let content = fs::read_to_string(&path).map_err(|source| ReadError::Io {
            path: path.clone(),
            source,
        })?;

        // owfs right-aligns values with leading blanks
        match content.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            // "nan" and "inf" parse, but are not temperatures
            Ok(_) => Err(ReadError::Parse {
                path,
                content,
                source: None,
            }),
            Err(source) => Err(ReadError::Parse {
                path,
                content,
                source: Some(source),
            }),
        }
    }
}
