use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    routes::AppState,
    services::{
        filter::FilterCriteria,
        recommendations,
        similarity::{SimilarTitle, SimilarityOutcome},
    },
};

#[derive(Debug, Deserialize)]
pub struct SimilarRequest {
    pub title: String,
    #[serde(default)]
    pub filters: FilterCriteria,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub title: String,
    pub similar: Vec<SimilarTitle>,
}

/// Handler for the correlation-based "similar movies" endpoint
///
/// A title without ratings among the filtered movies is a 404, while a known
/// title with no correlations above the overlap threshold is an empty list.
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SimilarRequest>,
) -> AppResult<Json<SimilarResponse>> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("title must not be empty".to_string()));
    }
    let top_n = state.config.resolve_top_n(request.top_n)?;

    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        top_n,
        "Processing similarity request"
    );

    let catalog = state.store.get().await?;
    let min_common_raters = state.config.min_common_raters;
    let SimilarRequest { title, filters, .. } = request;

    // Pivoting and correlating is CPU-bound; keep it off the async workers.
    let (title, outcome) = tokio::task::spawn_blocking(move || {
        let outcome =
            recommendations::get_similar(&catalog, &filters, &title, top_n, min_common_raters);
        (title, outcome)
    })
    .await
    .map_err(|e| AppError::Internal(format!("similarity task failed: {}", e)))?;

    match outcome {
        SimilarityOutcome::Found(similar) => Ok(Json(SimilarResponse { title, similar })),
        SimilarityOutcome::UnknownTitle => Err(AppError::NotFound(format!(
            "{} has no ratings among the filtered movies",
            title
        ))),
    }
}
