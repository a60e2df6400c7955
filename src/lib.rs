//! # OneWire Exporter
//!
//! Publishes 1-Wire temperature sensor readings from an owfs mount as
//! Prometheus metrics and as a JSON snapshot.
//!
//! ## How it works
//!
//! - **Discovery**: at startup the device root (`/mnt/1wire/`) is scanned
//!   once for DS18B20 sensors (family `28`) that expose a `temperature` file
//! - **Sampling**: every 10 seconds each discovered sensor is read and the
//!   results are published to a shared [`ReadingStore`]
//! - **Serving**: `/metrics` exposes the `onewire_temperature_c` gauge and
//!   `/json` the readings of the last completed cycle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use onewire_exporter::{
//!     host_identifier, start_web_server, AppState, DeviceEnumerator, OneWireReader,
//!     ReadingStore, Sampler, WebConfig, DEFAULT_DEVICE_PATH,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let devices = DeviceEnumerator::new(DEFAULT_DEVICE_PATH).discover()?;
//!     let store = Arc::new(ReadingStore::new()?);
//!     let (_stop, shutdown) = tokio::sync::watch::channel(false);
//!
//!     let state = AppState::new(Arc::clone(&store), WebConfig::default())
//!         .with_device_count(devices.len());
//!     let sampler = Sampler::new(
//!         OneWireReader::new(DEFAULT_DEVICE_PATH),
//!         devices,
//!         store,
//!         host_identifier(),
//!     );
//!     tokio::spawn(sampler.run(shutdown.clone()));
//!
//!     start_web_server(state, shutdown).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod sampler;
pub mod sensors;
pub mod store;
pub mod web;

// Re-export public API
pub use error::{DiscoveryError, ExporterError, ReadError, Result};
pub use sampler::{CycleReport, Sampler};
pub use sensors::{
    DeviceEnumerator, DeviceId, DeviceList, DiscoveryStrategy, OneWireReader, Reading,
    SensorKind, SensorSource,
};
pub use store::{ReadingStore, METRIC_NAME};
pub use web::{start_web_server, AppState, WebConfig};

/// Where owfs mounts the 1-Wire bus
pub const DEFAULT_DEVICE_PATH: &str = "/mnt/1wire/";

/// Seconds between sampling cycles
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Family code of DS18B20 temperature sensors
pub const TEMPERATURE_FAMILY: &str = "28";

/// The default listen address, all interfaces
pub const DEFAULT_LISTEN_ADDRESS: &str = ":8105";

pub const DEFAULT_METRICS_PATH: &str = "/metrics";

pub const DEFAULT_JSON_PATH: &str = "/json";

/// Name of this host, used as the `hostname` label.
pub fn host_identifier() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}
