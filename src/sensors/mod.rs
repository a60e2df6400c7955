//! Sensor discovery and sampling.
//!
//! Devices are found once at startup by [`DeviceEnumerator`] and then read
//! through a [`SensorSource`], normally the filesystem-backed
//! [`OneWireReader`].

pub mod data;
pub mod discovery;
pub mod reader;

// Re-export commonly used items
pub use data::{DeviceId, DeviceList, Reading, SensorKind};
pub use discovery::{DeviceEnumerator, DiscoveryStrategy};
pub use reader::{OneWireReader, SensorSource};
