use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Recommendation, RecommendationCard, RecommendationResponse},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    pub n: Option<usize>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Query(params) = query.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    let n = params.n.unwrap_or(state.default_recommendations);
    if n > state.max_recommendations {
        return Err(AppError::InvalidInput(format!(
            "At most {} recommendations can be requested",
            state.max_recommendations
        )));
    }

    tracing::info!(
        request_id = %request_id,
        title = %params.title,
        n = n,
        "Processing recommendation request"
    );

    let recommender = state.recommender.clone();
    let title = params.title;
    let recommendation = tokio::task::spawn_blocking(move || recommender.recommend(&title, n))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let (matched_title, recommendations) = match recommendation {
        Recommendation::Found {
            matched_title,
            recommendations,
        } => (matched_title, recommendations),
        Recommendation::NotFound { message } => return Err(AppError::NotFound(message)),
    };

    let ids = recommendations.iter().map(|r| r.id).collect();
    let posters = state.posters.resolve_batch(ids).await;

    let recommendations = recommendations
        .into_iter()
        .zip(posters)
        .map(|(title, poster_url)| RecommendationCard::new(title, poster_url))
        .collect();

    tracing::info!(
        request_id = %request_id,
        matched = %matched_title,
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse {
        matched_title,
        recommendations,
    }))
}
