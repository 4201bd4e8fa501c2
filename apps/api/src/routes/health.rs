use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Static liveness message.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "API is running!",
        "usage": "POST to /recommend"
    }))
}

/// GET /health
/// Returns service version and the loaded catalog size.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "recommender",
        "model": state.model_name,
        "response_schema": state.recommender.schema(),
        "catalog_size": state.recommender.catalog().len()
    }))
}
