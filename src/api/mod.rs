use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{DashboardService, ExplorerService};
use crate::state::SharedState;
use crate::web;

mod assets;
mod dashboard;
mod error;
mod explorer;
mod observability;
mod system;
mod types;
pub mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub started_at: chrono::DateTime<chrono::Utc>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn explorer(&self) -> &Arc<ExplorerService> {
        &self.shared.explorer
    }

    #[must_use]
    pub fn dashboard(&self) -> &Arc<DashboardService> {
        &self.shared.dashboard
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        started_at: chrono::Utc::now(),
        prometheus_handle,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/overview", get(dashboard::get_overview))
        .route("/tags", get(dashboard::get_tag_insights))
        .route("/explorer/options", get(explorer::get_options))
        .route("/explorer/search", get(explorer::search))
        .route("/movies/{id}/links", get(explorer::get_movie_links))
        .route("/system/status", get(system::get_status))
        .route("/system/reload", post(system::reload_tables))
        .route("/metrics", get(observability::get_metrics));

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(web::home_page))
        .route("/overview", get(web::overview_page))
        .route("/tags", get(web::tags_page))
        .route("/explorer", get(web::explorer_page))
        .route("/assets/{*path}", get(assets::serve_asset))
        .nest("/api", api_router)
        .fallback(web::not_found_page)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}
