//! Chart endpoints for the overview and tag-insights pages.
//!
//! Handlers only map HTTP to [`DashboardService`](crate::services::DashboardService)
//! calls; chart assembly lives in the service.

use axum::{
    Json,
    extract::{RawQuery, State},
};
use std::sync::Arc;

use super::validation::parse_genre_selection;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{OverviewCharts, TagInsights};

/// Returns the four overview charts.
///
/// # Endpoint
/// `GET /api/overview`
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<OverviewCharts>>, ApiError> {
    let charts = state.dashboard().overview()?;
    Ok(Json(ApiResponse::success(charts)))
}

/// Returns the tag charts.
///
/// # Endpoint
/// `GET /api/tags?genres=Drama,Comedy`
///
/// Without a `genres` (or repeated `genre`) parameter every genre is drawn.
/// `applied=1` with no genres selects none.
pub async fn get_tag_insights(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<TagInsights>>, ApiError> {
    let selection = parse_genre_selection(query.as_deref());
    let insights = state.dashboard().tag_insights(selection.as_deref())?;
    Ok(Json(ApiResponse::success(insights)))
}
