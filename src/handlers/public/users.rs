// handlers/public/users.rs - GET /api/users[/:uid]
use axum::extract::{Path, State};
use serde_json::Value;

use crate::api::format::{document_to_json, documents_to_json};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let users = state.users.list().await?;
    Ok(ApiResponse::ok(documents_to_json(users)))
}

pub async fn get(State(state): State<AppState>, Path(uid): Path<String>) -> ApiResult<Value> {
    let user = state.users.get_one(&uid).await?;
    Ok(ApiResponse::ok(document_to_json(user)))
}
