use std::sync::Arc;

use crate::recommendation::service::RecommendationService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the immutable catalog snapshot and the model client.
    pub recommender: Arc<RecommendationService>,
    /// Model identifier, reported by `/health`.
    pub model_name: String,
}
