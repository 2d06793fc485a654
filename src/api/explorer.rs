//! Movie explorer endpoints.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use std::sync::Arc;

use super::validation::{parse_explorer_query, validate_movie_id};
use super::{ApiError, ApiResponse, AppState, MovieLinksDto};
use crate::domain::MovieId;
use crate::services::{ExplorerOptions, SearchResults};

/// Widget choices and their default values.
///
/// # Endpoint
/// `GET /api/explorer/options`
pub async fn get_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ExplorerOptions>>, ApiError> {
    let options = state.explorer().options()?;
    Ok(Json(ApiResponse::success(options)))
}

/// Runs the filter pipeline and returns one page of cards.
///
/// # Endpoint
/// `GET /api/explorer/search?genre=Comedy&genre=Drama&year_from=1990&year_to=2018&min_rating=3.5&min_votes=50&keyword=&tag=funny&page=1`
///
/// Multi-valued filters repeat their key. Omitted keys leave the filter inactive.
pub async fn search(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<SearchResults>>, ApiError> {
    let query = parse_explorer_query(query.as_deref())?;
    let results = state.explorer().search(&query.filter, query.page).await?;
    Ok(Json(ApiResponse::success(results)))
}

/// Enriched IMDb and poster URLs of one movie.
///
/// # Endpoint
/// `GET /api/movies/{id}/links`
pub async fn get_movie_links(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MovieLinksDto>>, ApiError> {
    let id = MovieId::new(validate_movie_id(id)?);
    let links = state
        .explorer()
        .movie_links(id)?
        .ok_or_else(|| ApiError::not_found("Links for movie", id))?;

    Ok(Json(ApiResponse::success(MovieLinksDto {
        movie_id: id.value(),
        imdb_url: links.imdb_url,
        poster_url: links.poster_url,
    })))
}
