// handlers/public/articles.rs - GET /api/articles[/:name]
use axum::extract::{Path, State};
use serde_json::Value;

use crate::api::format::{to_api_value, to_api_values};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/articles - all articles, sorted by name
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let articles = state.articles.list().await?;
    Ok(ApiResponse::ok(to_api_values(&articles)?))
}

/// GET /api/articles/:name
pub async fn get(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Value> {
    let article = state.articles.get_one(&name).await?;
    Ok(ApiResponse::ok(to_api_value(&article)?))
}
