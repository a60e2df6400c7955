//! HTTP handlers for the exporter endpoints.

use crate::sensors::Reading;
use crate::web::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

/// Landing page linking to the metrics and JSON endpoints.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<html>
<head><title>OneWire Exporter</title></head>
<body>
<h1>OneWire Exporter</h1>
<p><a href="{metrics}">Metrics</a></p>
<p><a href="{json}">JSON Metrics</a></p>
</body>
</html>"#,
        metrics = state.config.metrics_path,
        json = state.config.json_path,
    ))
}

/// Gauge projection in the Prometheus text format.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.store.render_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Readings of the last completed sampling cycle.
pub async fn json_snapshot(State(state): State<AppState>) -> Json<Vec<Reading>> {
    let snapshot = state.store.current().await;
    Json(snapshot.as_ref().clone())
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "onewire-exporter",
        "version": env!("CARGO_PKG_VERSION"),
        "devices": state.device_count,
    }))
}
