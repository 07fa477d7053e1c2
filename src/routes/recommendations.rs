use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    routes::AppState,
    services::{
        filter::FilterCriteria,
        recommendations::{self, Recommendations},
    },
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub filters: FilterCriteria,
    pub top_n: Option<usize>,
    pub exclude_title: Option<String>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Recommendations>> {
    let top_n = state.config.resolve_top_n(request.top_n)?;

    tracing::info!(
        request_id = %request_id,
        top_n,
        exclude_title = ?request.exclude_title,
        "Processing recommendation request"
    );

    let catalog = state.store.get().await?;
    let response = recommendations::get_recommendations(
        &catalog,
        &request.filters,
        top_n,
        request.exclude_title.as_deref(),
        state.config.bayes_m,
    );

    Ok(Json(response))
}
