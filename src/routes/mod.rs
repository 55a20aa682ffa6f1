use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{PosterService, Recommender},
};

pub mod recommendations;
pub mod titles;

/// Shared, read-only application state
pub struct AppState {
    pub recommender: Recommender,
    pub posters: PosterService,
    /// Result count used when a request omits `n`
    pub default_recommendations: usize,
    pub max_recommendations: usize,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/titles", get(titles::list))
        .route("/recommendations", get(recommendations::recommend))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let dataset = state.recommender.dataset();
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "catalog_size": dataset.len(),
            "loaded_at": dataset.loaded_at().to_rfc3339(),
        })),
    )
}
