// handlers/protected/uploads.rs - image upload and removal
use axum::extract::{Multipart, Path, State};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::upload::{ImageFile, UploadOutcome};

/// Files under one field name plus the optional `folder` text field
struct UploadForm {
    files: Vec<ImageFile>,
    folder: Option<String>,
}

async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        files: Vec::new(),
        folder: None,
    };

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some(name) if name == file_field => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                form.files.push(ImageFile::new(filename, content_type.as_deref(), bytes));
            }
            Some("folder") => {
                form.folder = Some(field.text().await?);
            }
            _ => {} // Ignore unknown fields.
        }
    }
    Ok(form)
}

/// POST /api/upload-image - multipart field `image`, optional `folder`
pub async fn upload_image(State(state): State<AppState>, multipart: Multipart) -> ApiResult<UploadOutcome> {
    let form = read_form(multipart, "image").await?;
    let file = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let outcome = state.uploads.upload_one(file, form.folder.as_deref()).await?;
    Ok(ApiResponse::ok(outcome))
}

/// POST /api/upload-images - multipart field `images` (up to the batch limit)
pub async fn upload_images(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Value> {
    let form = read_form(multipart, "images").await?;
    let outcomes = state.uploads.upload_many(form.files, form.folder.as_deref()).await?;

    let urls: Vec<String> = outcomes.into_iter().map(|o| o.url).collect();
    Ok(ApiResponse::ok(json!({
        "count": urls.len(),
        "urls": urls
    })))
}

/// DELETE /api/images/:id - `:id` is the metadata id returned by upload-image
pub async fn delete_image(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let removed = state.uploads.delete(&id).await?;
    tracing::info!("Deleted image {} ({})", id, removed.url);

    Ok(ApiResponse::ok(json!({
        "message": "Image deleted",
        "id": id
    })))
}
