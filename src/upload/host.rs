use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

use crate::config::ImageHostConfig;
use crate::upload::ImageFile;

/// A stored image as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Image host credentials are not configured")]
    NotConfigured,

    #[error("Invalid image host URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Image host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Remote image storage
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, file: &ImageFile, content_type: &str, folder: &str) -> Result<HostedImage, HostError>;

    async fn delete(&self, public_id: &str) -> Result<(), HostError>;
}

/// Cloudinary's signed upload API
pub struct CloudinaryHost {
    client: reqwest::Client,
    endpoint: Url,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryHost {
    pub fn new(config: &ImageHostConfig) -> Result<Self, HostError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // Url::join drops the last segment of a base without a trailing slash
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            endpoint: Url::parse(&base)?,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    fn action_url(&self, action: &str) -> Result<Url, HostError> {
        Ok(self.endpoint.join(&format!("{}/image/{}", self.cloud_name, action))?)
    }

    async fn read_error(response: reqwest::Response) -> HostError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "unreadable error body".to_string(),
        };
        HostError::Rejected { status, message }
    }
}

/// Request signature: parameters sorted by name, joined as `k=v&k=v`,
/// followed by the API secret, SHA-256 hex encoded.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, file: &ImageFile, content_type: &str, folder: &str) -> Result<HostedImage, HostError> {
        if !self.is_configured() {
            return Err(HostError::NotConfigured);
        }

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(&[("folder", folder), ("timestamp", &timestamp)], &self.api_secret);

        let part = Part::stream(reqwest::Body::from(file.bytes.clone()))
            .file_name(file.filename.clone())
            .mime_str(content_type)?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.action_url("upload")?)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: UploadResponse = response.json().await?;
        Ok(HostedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), HostError> {
        if !self.is_configured() {
            return Err(HostError::NotConfigured);
        }

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(&[("public_id", public_id), ("timestamp", &timestamp)], &self.api_secret);

        let form = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.api_key.clone()),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ];

        let response = self
            .client
            .post(self.action_url("destroy")?)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }
        Ok(())
    }
}
