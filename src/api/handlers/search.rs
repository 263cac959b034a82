//! JSON search handlers

use crate::{
    search::{SearchQuery, SearchUrlBuilder},
    types::{RentalReport, Result, SearchRequest, SearchUrlResponse},
    AppState,
};
use axum::{extract::State, Json};

/// Run a full search: link plus model narration
#[utoipa::path(
    post,
    path = "/api/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search link and narrated offers", body = RentalReport),
        (status = 400, description = "Invalid input"),
        (status = 500, description = "Model call failed"),
        (status = 503, description = "Model provider unreachable")
    ),
    tag = "search"
)]
pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<RentalReport>> {
    let config = state.config_manager.config();
    let query = SearchQuery::from(payload);

    let report = state.advisor().advise(&config, &query).await?;

    Ok(Json(report))
}

/// Build the search link only, without calling a model
#[utoipa::path(
    post,
    path = "/api/url",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search link", body = SearchUrlResponse),
        (status = 400, description = "Invalid input")
    ),
    tag = "search"
)]
pub async fn search_url(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchUrlResponse>> {
    let config = state.config_manager.config();
    let builder = SearchUrlBuilder::from_config(&config.search);
    let url = SearchQuery::from(payload).search_url(&builder)?;

    Ok(Json(SearchUrlResponse { url }))
}
