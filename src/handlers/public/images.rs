// handlers/public/images.rs - GET /api/images?folder=...
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::Value;

use crate::api::format::to_api_values;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImagesQuery {
    /// Only images stored under this folder
    pub folder: Option<String>,
}

/// GET /api/images - image metadata, newest first
pub async fn list(State(state): State<AppState>, Query(query): Query<ImagesQuery>) -> ApiResult<Value> {
    let folder = query.folder.as_deref().map(str::trim).filter(|f| !f.is_empty());
    let images = state.uploads.list(folder).await?;
    Ok(ApiResponse::ok(to_api_values(&images)?))
}
