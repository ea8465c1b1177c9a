// handlers/public/portfolios.rs - GET /api/portfolios[/:id]
use axum::extract::{Path, State};
use serde_json::Value;

use crate::api::format::{document_to_json, documents_to_json};
use crate::database::PortfolioKey;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/portfolios - newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let items = state.portfolios.list().await?;
    Ok(ApiResponse::ok(documents_to_json(items)))
}

/// GET /api/portfolios/:id - `:id` may be an ObjectId, a legacy numeric id or a slug
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let key = PortfolioKey::classify(&id);
    let item = state.portfolios.get_one(&key).await?;
    Ok(ApiResponse::ok(document_to_json(item)))
}
