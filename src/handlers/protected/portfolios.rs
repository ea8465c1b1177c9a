// handlers/protected/portfolios.rs - POST/PUT/DELETE /api/portfolios
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Map, Value};

use crate::api::format::document_to_json;
use crate::database::models::PortfolioInput;
use crate::database::PortfolioKey;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/portfolios - 201 with the stored item (slug derived from title)
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<PortfolioInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload?;
    let item = state.portfolios.create(input).await?;
    Ok(ApiResponse::created(document_to_json(item)))
}

/// PUT /api/portfolios/:id - shallow merge; `_id` in the body is ignored
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    let key = PortfolioKey::classify(&id);
    let item = state.portfolios.update(&key, body).await?;
    Ok(ApiResponse::ok(document_to_json(item)))
}

/// DELETE /api/portfolios/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let key = PortfolioKey::classify(&id);
    let removed = state.portfolios.delete(&key).await?;
    tracing::info!("Deleted portfolio {}", removed);

    Ok(ApiResponse::ok(json!({
        "message": "Portfolio deleted",
        "id": removed.to_hex()
    })))
}
