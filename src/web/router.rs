//! Web application router and middleware setup.

use crate::error::Result;
use crate::web::config::HEALTH_PATH;
use crate::web::{handlers, AppState};
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the axum application with all routes and middleware.
pub fn create_app(state: AppState) -> Result<Router> {
    state.config.validate()?;

    let mut app = Router::new()
        .route("/", get(handlers::index))
        .route(&state.config.metrics_path, get(handlers::metrics))
        .route(&state.config.json_path, get(handlers::json_snapshot))
        .route(HEALTH_PATH, get(handlers::health_check));

    if state.config.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let app = app
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    Ok(app)
}
