use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::MovieSummary,
    routes::AppState,
    services::{
        browse::{self, CandidateStats, SortKey},
        filter::{self, FilterCriteria},
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct BrowseRequest {
    #[serde(default)]
    pub filters: FilterCriteria,
    #[serde(default)]
    pub sort: SortKey,
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub movies: Vec<MovieSummary>,
    /// Sorted titles of the filtered movies, for title pickers
    pub titles: Vec<String>,
    /// Absent when no movie matched
    pub stats: Option<CandidateStats>,
}

/// Handler for the filtered movie listing
pub async fn browse(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<BrowseRequest>,
) -> AppResult<Json<BrowseResponse>> {
    let catalog = state.store.get().await?;
    let candidates = filter::filter(&catalog, &request.filters);

    tracing::info!(
        request_id = %request_id,
        candidates = candidates.len(),
        sort = ?request.sort,
        "Browse listing built"
    );

    Ok(Json(BrowseResponse {
        movies: browse::browse(&candidates, request.sort),
        titles: browse::titles(&candidates),
        stats: browse::summarize(&candidates),
    }))
}
