//! Image upload pipeline.
//!
//! `Received -> Validated -> Uploaded -> MetadataPersisted -> Responded`.
//! Validation failures reject the request before any network call. A failed
//! remote upload degrades to a placeholder URL instead of failing.

pub mod host;
pub mod pipeline;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

use crate::config::UploadConfig;
use crate::database::models::ImageMetadata;
use crate::database::StoreError;

pub use host::{CloudinaryHost, HostError, HostedImage, ImageHost};
pub use pipeline::{UploadOutcome, UploadPipeline};

pub const ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// A file buffered in memory from a multipart field
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn new(filename: impl Into<String>, content_type: Option<&str>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Rejected(String),

    #[error("Image not found")]
    NotFound,

    #[error("Upload failed: {0}")]
    OperationFailed(String),
}

impl From<StoreError> for UploadError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => UploadError::NotFound,
            other => UploadError::OperationFailed(other.to_string()),
        }
    }
}

/// Where image metadata is recorded
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    async fn record(&self, metadata: ImageMetadata) -> Result<ImageMetadata, StoreError>;

    async fn find(&self, id: &str) -> Result<Option<ImageMetadata>, StoreError>;

    async fn remove(&self, id: &str) -> Result<bool, StoreError>;

    async fn list(&self, folder: Option<&str>) -> Result<Vec<ImageMetadata>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_file_bytes: usize,
    pub max_files: usize,
    pub default_folder: String,
    pub placeholder_url: String,
    /// Fail the upload (and remove the remote image) when metadata cannot be stored
    pub strict_metadata: bool,
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_file_bytes: config.max_file_bytes,
            max_files: config.max_files,
            default_folder: config.default_folder.clone(),
            placeholder_url: config.placeholder_url.clone(),
            strict_metadata: config.strict_metadata,
        }
    }
}

impl UploadPolicy {
    pub fn folder(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim) {
            Some(folder) if !folder.is_empty() => folder.to_string(),
            _ => self.default_folder.clone(),
        }
    }

    /// Check size and type. Returns the content type to send upstream.
    pub fn validate(&self, file: &ImageFile) -> Result<String, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Rejected(format!("File '{}' is empty", file.filename)));
        }
        if file.bytes.len() > self.max_file_bytes {
            return Err(UploadError::Rejected(format!(
                "File '{}' is too large: {} bytes (limit {} bytes)",
                file.filename,
                file.bytes.len(),
                self.max_file_bytes
            )));
        }

        let content_type = resolve_content_type(file);
        if !ALLOWED_TYPES.contains(&content_type.as_str()) {
            return Err(UploadError::Rejected(format!(
                "Invalid file type '{}'. Only JPEG, PNG, GIF and WebP images are allowed",
                content_type
            )));
        }
        Ok(content_type)
    }

    pub fn check_batch(&self, count: usize) -> Result<(), UploadError> {
        if count == 0 {
            return Err(UploadError::Rejected("No files uploaded".to_string()));
        }
        if count > self.max_files {
            return Err(UploadError::Rejected(format!(
                "Too many files: {} (limit {})",
                count, self.max_files
            )));
        }
        Ok(())
    }
}

/// Declared type, or a guess from the filename when the client sent none
fn resolve_content_type(file: &ImageFile) -> String {
    let declared = file
        .content_type
        .as_deref()
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty() && t != "application/octet-stream");

    let content_type = declared.unwrap_or_else(|| {
        mime_guess::from_path(&file.filename)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default()
    });

    match content_type.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => content_type,
    }
}
