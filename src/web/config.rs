//! Web server configuration.

use crate::error::{ExporterError, Result};
use serde::{Deserialize, Serialize};

/// Path of the liveness endpoint, which is not configurable.
pub const HEALTH_PATH: &str = "/health";

/// Configuration for the web server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Address to listen on, `host:port` or `:port` for all interfaces
    pub listen_address: String,
    /// Path under which to expose Prometheus metrics
    pub metrics_path: String,
    /// Path under which to expose the JSON snapshot
    pub json_path: String,
    /// Whether to enable CORS
    pub enable_cors: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: crate::DEFAULT_LISTEN_ADDRESS.to_string(),
            metrics_path: crate::DEFAULT_METRICS_PATH.to_string(),
            json_path: crate::DEFAULT_JSON_PATH.to_string(),
            enable_cors: true,
        }
    }
}

impl WebConfig {
    /// Create a new web configuration listening on `listen_address`.
    pub fn new(listen_address: impl Into<String>) -> Self {
        Self {
            listen_address: listen_address.into(),
            ..Default::default()
        }
    }

    /// Set the listen address.
    pub fn with_listen_address(mut self, listen_address: impl Into<String>) -> Self {
        self.listen_address = listen_address.into();
        self
    }

    /// Set the metrics path.
    pub fn with_metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = path.into();
        self
    }

    /// Set the JSON snapshot path.
    pub fn with_json_path(mut self, path: impl Into<String>) -> Self {
        self.json_path = path.into();
        self
    }

    /// Enable or disable CORS.
    pub fn with_cors(mut self, enable_cors: bool) -> Self {
        self.enable_cors = enable_cors;
        self
    }

    /// Get the address to bind, expanding `:port` to all interfaces.
    pub fn bind_address(&self) -> String {
        if self.listen_address.starts_with(':') {
            format!("0.0.0.0{}", self.listen_address)
        } else {
            self.listen_address.clone()
        }
    }

    /// Check that the endpoint paths can be routed side by side.
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [("metrics", &self.metrics_path), ("json", &self.json_path)] {
            if !path.starts_with('/') {
                return Err(ExporterError::config_error(format!(
                    "{} path must start with '/': {:?}",
                    name, path
                )));
            }
            if path == "/" || path == HEALTH_PATH {
                return Err(ExporterError::config_error(format!(
                    "{} path {:?} is reserved",
                    name, path
                )));
            }
        }

        if self.metrics_path == self.json_path {
            return Err(ExporterError::config_error(format!(
                "metrics and json paths are both {:?}",
                self.metrics_path
            )));
        }

        Ok(())
    }
}
