//! The sampling loop.
//!
//! Reads every discovered device once per cycle and publishes the results
//! to the [`ReadingStore`]. A device that fails to read is left out of the
//! cycle's snapshot and keeps its previous gauge value. The next cycle is
//! the only retry.

use crate::error::ReadError;
use crate::sensors::{DeviceId, DeviceList, Reading, SensorSource};
use crate::store::ReadingStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::{task, time};
use tracing::{debug, error, info, warn};

/// Outcome of one pass over the device list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Periodically samples a fixed list of devices into a store.
pub struct Sampler<S> {
    source: Arc<S>,
    devices: Arc<DeviceList>,
    store: Arc<ReadingStore>,
    hostname: String,
    interval: Duration,
}

impl<S: SensorSource + 'static> Sampler<S> {
    pub fn new(
        source: S,
        devices: DeviceList,
        store: Arc<ReadingStore>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            source: Arc::new(source),
            devices: Arc::new(devices),
            store,
            hostname: hostname.into(),
            interval: Duration::from_secs(crate::DEFAULT_INTERVAL_SECS),
        }
    }

    /// Override the pause between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn devices(&self) -> &DeviceList {
        &self.devices
    }

    /// Read every device once and publish the results.
    pub async fn sample_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        let mut readings = Vec::with_capacity(self.devices.len());

        for (device_id, result) in self.read_all().await {
            match result {
                Ok(value) => {
                    debug!(device_id = %device_id, value, hostname = %self.hostname, "Value read from device");
                    self.store.set(&device_id, &self.hostname, value);
                    readings.push(Reading::temperature(device_id, value));
                    report.succeeded += 1;
                }
                Err(e) => {
                    warn!(device_id = %device_id, error = %e, "Error reading from device");
                    report.failed += 1;
                }
            }
        }

        self.store.replace(readings).await;
        debug!(succeeded = report.succeeded, failed = report.failed, "Sampling cycle complete");
        report
    }

    /// Read every device on the blocking pool; owfs reads can take most of a
    /// second while the sensor converts.
    async fn read_all(&self) -> Vec<(DeviceId, Result<f64, ReadError>)> {
        let source = Arc::clone(&self.source);
        let devices = Arc::clone(&self.devices);
        let pass = task::spawn_blocking(move || {
            devices
                .iter()
                .map(|device_id| (device_id.clone(), source.read(device_id)))
                .collect::<Vec<_>>()
        });

        match pass.await {
            Ok(results) => results,
            Err(e) => {
                error!(error = %e, "Device read pass failed");
                self.devices
                    .iter()
                    .map(|device_id| {
                        let failure = ReadError::Io {
                            path: device_id.as_str().into(),
                            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                        };
                        (device_id.clone(), Err(failure))
                    })
                    .collect()
            }
        }
    }

    /// Sample until `shutdown` turns true.
    ///
    /// If every sender of `shutdown` is dropped the loop runs for the rest of
    /// the process lifetime.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            devices = self.devices.len(),
            interval_secs = self.interval.as_secs_f64(),
            "Sampling started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.sample_cycle().await;

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = wait_for_stop(&mut shutdown) => break,
            }
        }

        info!("Sampling stopped");
    }
}

/// Resolve once the stop flag is set. Never resolves if the sender is gone.
pub async fn wait_for_stop(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
