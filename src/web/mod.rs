//! HTTP facade over the reading store.
//!
//! Serves the Prometheus scrape endpoint, the JSON snapshot endpoint, a
//! landing page and a health check. Handlers only read from the store.

pub mod config;
pub mod handlers;
pub mod router;

// Re-export commonly used items
pub use config::WebConfig;
pub use router::create_app;

use crate::error::{ExporterError, Result};
use crate::sampler::wait_for_stop;
use crate::store::ReadingStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReadingStore>,
    pub config: Arc<WebConfig>,
    pub device_count: usize,
}

impl AppState {
    pub fn new(store: Arc<ReadingStore>, config: WebConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            device_count: 0,
        }
    }

    /// Number of discovered devices, reported by the health check.
    pub fn with_device_count(mut self, device_count: usize) -> Self {
        self.device_count = device_count;
        self
    }
}

/// Serve the exporter endpoints until `shutdown` turns true.
pub async fn start_web_server(state: AppState, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let config = Arc::clone(&state.config);
    let app = create_app(state)?;
    let addr = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Failed to bind to {}: {}", addr, e)))?;

    info!(http_listen = %addr, "Exporter listening");
    info!("Metrics endpoint: http://{}{}", addr, config.metrics_path);
    info!("JSON endpoint: http://{}{}", addr, config.json_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { wait_for_stop(&mut shutdown).await })
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Server error: {}", e)))?;

    info!("Web server stopped");
    Ok(())
}
