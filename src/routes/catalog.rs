use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    routes::AppState,
    services::{bayesian::GlobalStats, catalog::LoadReport, Catalog},
};

/// What the UI needs to build its filter widgets
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub movies: usize,
    pub genres: Vec<String>,
    pub year_bounds: Option<(i32, i32)>,
    pub rating_bounds: Option<(f64, f64)>,
    pub scoring: GlobalStats,
    pub report: LoadReport,
    pub loaded_at: DateTime<Utc>,
}

impl CatalogResponse {
    fn new(catalog: &Catalog, m_override: Option<u32>) -> Self {
        Self {
            movies: catalog.len(),
            genres: catalog.genres(),
            year_bounds: catalog.year_bounds(),
            rating_bounds: catalog.rating_bounds(),
            scoring: GlobalStats::from_ratings(catalog.merged_ratings(), m_override),
            report: catalog.report().clone(),
            loaded_at: catalog.loaded_at(),
        }
    }
}

/// Describes the loaded catalog
pub async fn describe(State(state): State<Arc<AppState>>) -> AppResult<Json<CatalogResponse>> {
    let catalog = state.store.get().await?;
    Ok(Json(CatalogResponse::new(&catalog, state.config.bayes_m)))
}

/// Drops the cached catalog and loads it again from the source
pub async fn reload(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<CatalogResponse>> {
    tracing::info!(request_id = %request_id, "Reloading catalog");
    let catalog = state.store.reload().await?;
    Ok(Json(CatalogResponse::new(&catalog, state.config.bayes_m)))
}
