//! Locating temperature sensors below the 1-Wire mount.

use crate::error::DiscoveryError;
use crate::sensors::data::{DeviceId, DeviceList};
use crate::sensors::reader::TEMPERATURE_FILE;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the per-device file holding the family code.
pub const FAMILY_FILE: &str = "family";

/// How a device directory is matched against the wanted family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryStrategy {
    /// Compare the trimmed contents of the `family` file. Directories
    /// without one fall back to the name prefix.
    #[default]
    FamilyFile,
    /// Legacy matching on the `<family>.` directory name prefix only.
    NamePrefix,
}

/// Scans a root directory for devices of one hardware family.
#[derive(Debug, Clone)]
pub struct DeviceEnumerator {
    root: PathBuf,
    family: String,
    strategy: DiscoveryStrategy,
}

impl DeviceEnumerator {
    /// Enumerator for DS18B20 temperature sensors below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            family: crate::TEMPERATURE_FAMILY.to_string(),
            strategy: DiscoveryStrategy::default(),
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    pub fn with_strategy(mut self, strategy: DiscoveryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// List the eligible devices.
    ///
    /// Only a root that cannot be listed is an error. Individual entries that
    /// don't qualify are skipped, with a warning for anything unexpected.
    pub fn discover(&self) -> Result<DeviceList, DiscoveryError> {
        let entries = fs::read_dir(&self.root).map_err(|source| DiscoveryError::Unreadable {
            path: self.root.clone(),
            source,
        })?;

        let mut devices = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(name = ?raw, "Skipping device directory with non UTF-8 name");
                    continue;
                }
            };

            if !self.is_family_member(&path, &name) {
                continue;
            }

            let value_file = path.join(TEMPERATURE_FILE);
            if let Err(e) = fs::metadata(&value_file) {
                warn!(device_id = %name, path = %value_file.display(), error = %e, "Skipping device without temperature file");
                continue;
            }

            info!(device_id = %name, "Device found");
            devices.push(DeviceId::new(name));
        }

        Ok(devices.into_iter().collect())
    }

    fn is_family_member(&self, dir: &Path, name: &str) -> bool {
        match self.strategy {
            DiscoveryStrategy::NamePrefix => self.has_family_prefix(name),
            DiscoveryStrategy::FamilyFile => {
                let family_file = dir.join(FAMILY_FILE);
                if !family_file.exists() {
                    return self.has_family_prefix(name);
                }
                match fs::read_to_string(&family_file) {
                    Ok(code) if code.trim() == self.family => true,
                    Ok(code) => {
                        debug!(device_id = %name, family = %code.trim(), "Ignoring device of another family");
                        false
                    }
                    Err(e) => {
                        warn!(device_id = %name, path = %family_file.display(), error = %e, "Skipping device with unreadable family file");
                        false
                    }
                }
            }
        }
    }

    fn has_family_prefix(&self, name: &str) -> bool {
        name.strip_prefix(self.family.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_device(root: &Path, name: &str, family: Option<&str>, temperature: Option<&str>) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        if let Some(family) = family {
            fs::write(dir.join(FAMILY_FILE), family).unwrap();
        }
        if let Some(temperature) = temperature {
            fs::write(dir.join(TEMPERATURE_FILE), temperature).unwrap();
        }
    }

    fn sorted_ids(list: &DeviceList) -> Vec<String> {
        let mut ids: Vec<String> = list.iter().map(|d| d.to_string()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_discovers_matching_family() {
        let tmp = tempdir().unwrap();
        make_device(tmp.path(), "28.aaa", Some("28"), Some("23.500"));
        make_device(tmp.path(), "29.bbb", Some("29"), Some("1"));

        let devices = DeviceEnumerator::new(tmp.path()).discover().unwrap();
        assert_eq!(sorted_ids(&devices), vec!["28.aaa"]);
    }

    #[test]
    fn test_family_file_wins_over_name() {
        let tmp = tempdir().unwrap();
        make_device(tmp.path(), "renamed", Some("28\n"), Some("20.0"));
        make_device(tmp.path(), "28.fake", Some("10"), Some("20.0"));

        let devices = DeviceEnumerator::new(tmp.path()).discover().unwrap();
        assert_eq!(sorted_ids(&devices), vec!["renamed"]);
    }

    #[test]
    fn test_falls_back_to_prefix_without_family_file() {
        let tmp = tempdir().unwrap();
        make_device(tmp.path(), "28.ccc", None, Some("19.0"));
        make_device(tmp.path(), "280.ddd", None, Some("19.0"));

        let devices = DeviceEnumerator::new(tmp.path()).discover().unwrap();
        assert_eq!(sorted_ids(&devices), vec!["28.ccc"]);
    }

    #[test]
    fn test_name_prefix_strategy_ignores_family_file() {
        let tmp = tempdir().unwrap();
        make_device(tmp.path(), "28.aaa", Some("10"), Some("20.0"));
        make_device(tmp.path(), "renamed", Some("28"), Some("20.0"));

        let devices = DeviceEnumerator::new(tmp.path())
            .with_strategy(DiscoveryStrategy::NamePrefix)
            .discover()
            .unwrap();
        assert_eq!(sorted_ids(&devices), vec!["28.aaa"]);
    }

    #[test]
    fn test_skips_device_without_value_file() {
        let tmp = tempdir().unwrap();
        make_device(tmp.path(), "28.aaa", Some("28"), None);
        make_device(tmp.path(), "28.bbb", Some("28"), Some("21.0"));

        let devices = DeviceEnumerator::new(tmp.path()).discover().unwrap();
        assert_eq!(sorted_ids(&devices), vec!["28.bbb"]);
    }

    #[test]
    fn test_ignores_plain_files() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("28.file"), "not a directory").unwrap();
        fs::write(tmp.path().join("alarm"), "").unwrap();

        let devices = DeviceEnumerator::new(tmp.path()).discover().unwrap();
        assert!(devices.is_empty());
    }

    #[test]
    fn test_custom_family() {
        let tmp = tempdir().unwrap();
        make_device(tmp.path(), "10.aaa", Some("10"), Some("20.0"));
        make_device(tmp.path(), "28.bbb", Some("28"), Some("20.0"));

        let devices = DeviceEnumerator::new(tmp.path())
            .with_family("10")
            .discover()
            .unwrap();
        assert_eq!(sorted_ids(&devices), vec!["10.aaa"]);
    }

    #[test]
    fn test_missing_root_is_error() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = DeviceEnumerator::new(&missing).discover().unwrap_err();
        let DiscoveryError::Unreadable { path, .. } = err;
        assert_eq!(path, missing);
    }

    #[test]
    fn test_root_that_is_a_file_is_error() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("plain");
        fs::write(&file, "").unwrap();
        assert!(DeviceEnumerator::new(&file).discover().is_err());
    }

    #[test]
    fn test_discovery_is_deterministic() {
        let tmp = tempdir().unwrap();
        for i in 0..8 {
            make_device(tmp.path(), &format!("28.{i:03}"), Some("28"), Some("20.0"));
        }
        let enumerator = DeviceEnumerator::new(tmp.path());
        let first = enumerator.discover().unwrap();
        let second = enumerator.discover().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
    }
}
