// handlers/protected/profile.rs - PUT /api/me
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::api::format::to_api_value;
use crate::database::models::ProfilePatch;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Only the fields present in the body are changed
pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(patch) = payload?;
    let profile = state.profile.update(patch).await?;
    Ok(ApiResponse::ok(to_api_value(&profile)?))
}
