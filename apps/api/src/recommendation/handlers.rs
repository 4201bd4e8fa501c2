//! Axum route handlers for the Recommendation API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::recommendation::RecommendationResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Missing and `null` are treated like an empty query.
    #[serde(default)]
    pub query: Option<String>,
}

/// POST /recommend
///
/// Returns up to 10 recommended assessments for a job description. A model
/// reply that cannot be parsed still yields 200 with an empty list, an `error`
/// marker and the `raw_response` text.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let query = request.query.unwrap_or_default();
    let response = state.recommender.recommend(&query).await?;
    Ok(Json(response))
}
