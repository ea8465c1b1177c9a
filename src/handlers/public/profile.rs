// handlers/public/profile.rs - GET /api/me
use axum::extract::State;
use serde_json::Value;

use crate::api::format::to_api_value;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn get(State(state): State<AppState>) -> ApiResult<Value> {
    let profile = state.profile.get().await?;
    Ok(ApiResponse::ok(to_api_value(&profile)?))
}
