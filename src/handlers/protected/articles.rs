// handlers/protected/articles.rs - upvote and comment on an article
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::api::format::to_api_value;
use crate::database::models::NewComment;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// PUT /api/articles/:name/upvote - one vote per authenticated user
pub async fn upvote(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(name): Path<String>,
) -> ApiResult<Value> {
    let article = state.articles.upvote(&name, Some(&user.uid)).await?;
    tracing::info!("{} upvoted '{}' ({} votes)", user.uid, name, article.upvotes);
    Ok(ApiResponse::ok(to_api_value(&article)?))
}

/// POST /api/articles/:name/comments - body `{ "text": "..." }`, any text is appended as-is
pub async fn comment(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(comment) = payload?;
    let article = state.articles.add_comment(&name, &comment.text).await?;
    Ok(ApiResponse::ok(to_api_value(&article)?))
}
