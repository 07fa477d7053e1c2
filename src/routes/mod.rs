use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    store::CatalogStore,
};

pub mod catalog;
pub mod movies;
pub mod recommendations;
pub mod similar;

/// Shared application state
pub struct AppState {
    pub store: CatalogStore,
    pub config: Config,
}

impl AppState {
    pub fn new(store: CatalogStore, config: Config) -> Self {
        Self { store, config }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/catalog", get(catalog::describe))
        .route("/catalog/reload", post(catalog::reload))
        .route("/movies/browse", post(movies::browse))
        .route("/recommendations", post(recommendations::recommend))
        .route("/similar", post(similar::similar))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
