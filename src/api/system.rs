//! System status endpoints.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MovieServiceStatus, SystemStatus};
use crate::constants::tables;

/// Returns version, uptime, movie-service health and table state.
///
/// # Endpoint
/// `GET /api/system/status`
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let health = state.shared.catalog.health_check().await;

    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        started_at: state.started_at.to_rfc3339(),
        data_dir: state.shared.tables.root().display().to_string(),
        movie_service: MovieServiceStatus {
            base_url: state.config().movie_service.base_url.clone(),
            healthy: health.is_ok(),
            error: health.err().map(|e| e.to_string()),
        },
        genre_cache_entries: state.shared.genres.cached_entries(),
        tables: state.shared.tables.describe(tables::ALL),
    };

    Ok(Json(ApiResponse::success(status)))
}

/// Drops every cached table so the next request rereads the files.
///
/// # Endpoint
/// `POST /api/system/reload`
pub async fn reload_tables(State(state): State<Arc<AppState>>) -> Json<ApiResponse<&'static str>> {
    state.shared.tables.invalidate_all();
    Json(ApiResponse::success("Table cache cleared"))
}
