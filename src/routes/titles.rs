use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{models::TitleSummary, routes::AppState};

/// Handler listing every catalog title in catalog order
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<TitleSummary>> {
    let titles = state
        .recommender
        .dataset()
        .items()
        .iter()
        .map(TitleSummary::from)
        .collect();
    Json(titles)
}
