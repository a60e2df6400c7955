//! Shared store of the latest readings.
//!
//! The sampler is the only writer. HTTP handlers read from two projections:
//!
//! - the gauge projection, a Prometheus `GaugeVec` labelled by device and
//!   host. Entries are upserted and never removed, so a device that stops
//!   answering keeps its last good value.
//! - the snapshot projection, the full list of readings from the last
//!   completed cycle. It is swapped as a whole, so readers see either the
//!   previous list or the new one.

use crate::error::{ExporterError, Result};
use crate::sensors::{DeviceId, Reading};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Name of the exported temperature series.
pub const METRIC_NAME: &str = "onewire_temperature_c";

const METRIC_HELP: &str = "Onewire Temperature Sensor Value in Celsius.";
const DEVICE_LABEL: &str = "device_id";
const HOST_LABEL: &str = "hostname";

/// Latest readings, shared between the sampler and the web handlers.
pub struct ReadingStore {
    registry: Registry,
    temperature: GaugeVec,
    snapshot: RwLock<Arc<Vec<Reading>>>,
}

impl ReadingStore {
    /// Create an empty store with its own metrics registry.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let temperature = GaugeVec::new(
            Opts::new(METRIC_NAME, METRIC_HELP),
            &[DEVICE_LABEL, HOST_LABEL],
        )?;
        registry.register(Box::new(temperature.clone()))?;

        Ok(Self {
            registry,
            temperature,
            snapshot: RwLock::new(Arc::new(Vec::new())),
        })
    }

    /// Set the latest value for a device. Last write wins.
    pub fn set(&self, device_id: &DeviceId, host_id: &str, value: f64) {
        match self
            .temperature
            .get_metric_with_label_values(&[device_id.as_str(), host_id])
        {
            Ok(gauge) => gauge.set(value),
            Err(e) => warn!(device_id = %device_id, error = %e, "Failed to update temperature gauge"),
        }
    }

    /// Last value set for a device, if it was ever set.
    pub fn gauge_value(&self, device_id: &DeviceId, host_id: &str) -> Option<f64> {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == METRIC_NAME)
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                let labels = metric.get_label();
                labels
                    .iter()
                    .any(|l| l.get_name() == DEVICE_LABEL && l.get_value() == device_id.as_str())
                    && labels
                        .iter()
                        .any(|l| l.get_name() == HOST_LABEL && l.get_value() == host_id)
            })
            .map(|metric| metric.get_gauge().get_value())
    }

    /// Replace the snapshot with the output of a finished cycle.
    pub async fn replace(&self, readings: Vec<Reading>) {
        *self.snapshot.write().await = Arc::new(readings);
    }

    /// The readings of the last completed cycle.
    pub async fn current(&self) -> Arc<Vec<Reading>> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Encode the gauge projection in the Prometheus text format.
    pub fn render_metrics(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| ExporterError::web_server_error(format!("Metrics are not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: &str, value: f64) -> Reading {
        Reading::temperature(DeviceId::new(id), value)
    }

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = ReadingStore::new().unwrap();
        assert!(store.current().await.is_empty());
        assert_eq!(store.gauge_value(&DeviceId::new("28.aaa"), "pi"), None);
    }

    #[test]
    fn test_set_is_last_write_wins() {
        let store = ReadingStore::new().unwrap();
        let id = DeviceId::new("28.aaa");
        store.set(&id, "pi", 20.0);
        store.set(&id, "pi", 21.5);
        store.set(&id, "pi", 21.5);
        assert_eq!(store.gauge_value(&id, "pi"), Some(21.5));
        assert_eq!(store.gauge_value(&id, "other-host"), None);
    }

    #[tokio::test]
    async fn test_replace_swaps_whole_list() {
        let store = ReadingStore::new().unwrap();
        store.replace(vec![reading("28.a", 1.0), reading("28.b", 2.0)]).await;
        let before = store.current().await;

        store.replace(vec![reading("28.c", 3.0)]).await;
        let after = store.current().await;

        assert_eq!(before.len(), 2);
        assert_eq!(*after, vec![reading("28.c", 3.0)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_never_see_mixed_lists() {
        let store = Arc::new(ReadingStore::new().unwrap());
        let odd: Vec<Reading> = (0..50).map(|i| reading(&format!("28.{i}"), 1.0)).collect();
        let even: Vec<Reading> = (0..50).map(|i| reading(&format!("28.{i}"), 2.0)).collect();
        store.replace(odd.clone()).await;

        let writer = {
            let store = Arc::clone(&store);
            let (odd, even) = (odd.clone(), even.clone());
            tokio::spawn(async move {
                for i in 0..200 {
                    let next = if i % 2 == 0 { even.clone() } else { odd.clone() };
                    store.replace(next).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            readers.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let seen = store.current().await;
                    let first = seen[0].value;
                    assert_eq!(seen.len(), 50);
                    assert!(seen.iter().all(|r| r.value == first));
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }

    #[test]
    fn test_render_metrics_text_format() {
        let store = ReadingStore::new().unwrap();
        store.set(&DeviceId::new("28.aaa"), "pi", 23.5);
        let text = store.render_metrics().unwrap();
        assert!(text.contains("# HELP onewire_temperature_c Onewire Temperature Sensor Value in Celsius."));
        assert!(text.contains("# TYPE onewire_temperature_c gauge"));
        assert!(text.contains(r#"onewire_temperature_c{device_id="28.aaa",hostname="pi"} 23.5"#));
    }
}
