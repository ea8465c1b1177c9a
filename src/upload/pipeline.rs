use std::sync::Arc;

use futures::future::join_all;
use mongodb::bson::DateTime;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::database::models::ImageMetadata;
use crate::upload::{ImageCatalog, ImageFile, ImageHost, UploadError, UploadPolicy};

/// Result of one file going through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub url: String,
    /// Metadata id; absent when degraded or when best-effort persistence failed
    pub id: Option<String>,
    pub folder: String,
    pub degraded: bool,
    /// Host-side identifier, kept for rolling back a failed batch
    #[serde(skip)]
    pub public_id: Option<String>,
}

pub struct UploadPipeline {
    host: Arc<dyn ImageHost>,
    catalog: Arc<dyn ImageCatalog>,
    policy: UploadPolicy,
}

impl UploadPipeline {
    pub fn new(host: Arc<dyn ImageHost>, catalog: Arc<dyn ImageCatalog>, policy: UploadPolicy) -> Self {
        Self { host, catalog, policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub async fn upload_one(&self, file: ImageFile, folder: Option<&str>) -> Result<UploadOutcome, UploadError> {
        let folder = self.policy.folder(folder);
        let content_type = self.policy.validate(&file)?;
        self.store(&file, &content_type, &folder).await
    }

    /// Validate every file, then upload them concurrently. Outcomes keep the
    /// submission order. Every upload runs to completion; if any of them
    /// fails, the ones that succeeded are removed again so a failed batch
    /// leaves nothing behind.
    pub async fn upload_many(&self, files: Vec<ImageFile>, folder: Option<&str>) -> Result<Vec<UploadOutcome>, UploadError> {
        self.policy.check_batch(files.len())?;
        let folder = self.policy.folder(folder);

        let content_types = files
            .iter()
            .map(|file| self.policy.validate(file))
            .collect::<Result<Vec<_>, _>>()?;

        let uploads = files
            .iter()
            .zip(content_types.iter())
            .map(|(file, content_type)| self.store(file, content_type, &folder));

        let results = join_all(uploads).await;
        if results.iter().all(Result::is_ok) {
            return results.into_iter().collect();
        }

        let mut failure = None;
        for result in results {
            match result {
                Ok(outcome) => self.roll_back(&outcome).await,
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        Err(failure.unwrap_or_else(|| UploadError::OperationFailed("batch upload failed".to_string())))
    }

    /// Best-effort removal of an upload that belongs to a failed batch
    async fn roll_back(&self, outcome: &UploadOutcome) {
        if let Some(public_id) = &outcome.public_id {
            if let Err(e) = self.host.delete(public_id).await {
                warn!("Could not remove {} from failed batch: {}", public_id, e);
            }
        }
        if let Some(id) = &outcome.id {
            if let Err(e) = self.catalog.remove(id).await {
                error!("Could not remove metadata {} from failed batch: {}", id, e);
            }
        }
    }

    async fn store(&self, file: &ImageFile, content_type: &str, folder: &str) -> Result<UploadOutcome, UploadError> {
        let hosted = match self.host.upload(file, content_type, folder).await {
            Ok(hosted) => hosted,
            Err(e) => {
                warn!("Upload of '{}' failed, using placeholder: {}", file.filename, e);
                return Ok(UploadOutcome {
                    url: self.policy.placeholder_url.clone(),
                    id: None,
                    folder: folder.to_string(),
                    degraded: true,
                    public_id: None,
                });
            }
        };

        let metadata = ImageMetadata {
            id: None,
            url: hosted.url.clone(),
            public_id: Some(hosted.public_id.clone()),
            filename: file.filename.clone(),
            folder: folder.to_string(),
            uploaded_at: DateTime::now(),
        };

        let id = match self.catalog.record(metadata).await {
            Ok(saved) => saved.id.map(|oid| oid.to_hex()),
            Err(e) if self.policy.strict_metadata => {
                error!("Failed to record metadata for {}: {}", hosted.url, e);
                if let Err(e) = self.host.delete(&hosted.public_id).await {
                    warn!("Could not remove orphaned image {}: {}", hosted.public_id, e);
                }
                return Err(UploadError::OperationFailed(format!(
                    "could not record metadata for '{}'",
                    file.filename
                )));
            }
            Err(e) => {
                error!("Failed to record metadata for {} (image is live): {}", hosted.url, e);
                None
            }
        };

        info!("Uploaded '{}' to {}", file.filename, hosted.url);
        Ok(UploadOutcome {
            url: hosted.url,
            id,
            folder: folder.to_string(),
            degraded: false,
            public_id: Some(hosted.public_id),
        })
    }

    /// Remove an image. The remote delete is best-effort; the metadata row
    /// goes regardless.
    pub async fn delete(&self, id: &str) -> Result<ImageMetadata, UploadError> {
        let metadata = self.catalog.find(id).await?.ok_or(UploadError::NotFound)?;

        if let Some(public_id) = &metadata.public_id {
            if let Err(e) = self.host.delete(public_id).await {
                warn!("Remote delete of {} failed, removing metadata anyway: {}", public_id, e);
            }
        }

        if !self.catalog.remove(id).await? {
            return Err(UploadError::NotFound);
        }
        Ok(metadata)
    }

    pub async fn list(&self, folder: Option<&str>) -> Result<Vec<ImageMetadata>, UploadError> {
        Ok(self.catalog.list(folder).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;
    use crate::upload::{HostError, HostedImage};
    use async_trait::async_trait;
    use mongodb::bson::oid::ObjectId;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records calls; filenames starting with "fail" are refused
    #[derive(Default)]
    struct FakeHost {
        uploads: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
        fail_deletes: bool,
    }

    #[async_trait]
    impl ImageHost for FakeHost {
        async fn upload(&self, file: &ImageFile, _content_type: &str, folder: &str) -> Result<HostedImage, HostError> {
            self.uploads.lock().unwrap().push(file.filename.clone());
            if file.filename.starts_with("fail") {
                return Err(HostError::Rejected { status: 502, message: "bad gateway".to_string() });
            }
            // Finish out of submission order to exercise ordering
            let delay = 30u64.saturating_sub(file.bytes.len() as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(HostedImage {
                url: format!("https://img.example.com/{}/{}", folder, file.filename),
                public_id: format!("{}/{}", folder, file.filename),
            })
        }

        async fn delete(&self, public_id: &str) -> Result<(), HostError> {
            self.deletes.lock().unwrap().push(public_id.to_string());
            if self.fail_deletes {
                return Err(HostError::NotConfigured);
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        rows: Mutex<Vec<ImageMetadata>>,
        broken: bool,
        /// Refuse only this filename
        refuse: Option<&'static str>,
    }

    #[async_trait]
    impl ImageCatalog for FakeCatalog {
        async fn record(&self, mut metadata: ImageMetadata) -> Result<ImageMetadata, StoreError> {
            if self.broken || self.refuse == Some(metadata.filename.as_str()) {
                return Err(StoreError::Mapping("catalog offline".to_string()));
            }
            metadata.id = Some(ObjectId::new());
            self.rows.lock().unwrap().push(metadata.clone());
            Ok(metadata)
        }

        async fn find(&self, id: &str) -> Result<Option<ImageMetadata>, StoreError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|m| m.id.map(|o| o.to_hex()).as_deref() == Some(id)).cloned())
        }

        async fn remove(&self, id: &str) -> Result<bool, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|m| m.id.map(|o| o.to_hex()).as_deref() != Some(id));
            Ok(rows.len() < before)
        }

        async fn list(&self, folder: Option<&str>) -> Result<Vec<ImageMetadata>, StoreError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|m| folder.map_or(true, |f| m.folder == f)).cloned().collect())
        }
    }

    fn policy(strict_metadata: bool) -> UploadPolicy {
        UploadPolicy {
            max_file_bytes: 5 * 1024 * 1024,
            max_files: 10,
            default_folder: "images".to_string(),
            placeholder_url: "https://placehold.co/800x600".to_string(),
            strict_metadata,
        }
    }

    fn pipeline(host: Arc<FakeHost>, catalog: Arc<FakeCatalog>, strict: bool) -> UploadPipeline {
        UploadPipeline::new(host, catalog, policy(strict))
    }

    fn png(name: &str, size: usize) -> ImageFile {
        ImageFile::new(name, Some("image/png"), vec![7u8; size])
    }

    #[tokio::test]
    async fn single_upload_records_metadata() {
        let host = Arc::new(FakeHost::default());
        let catalog = Arc::new(FakeCatalog::default());
        let pipeline = pipeline(host.clone(), catalog.clone(), false);

        let outcome = pipeline.upload_one(png("cat.png", 10), None).await.unwrap();
        assert_eq!(outcome.url, "https://img.example.com/images/cat.png");
        assert_eq!(outcome.folder, "images");
        assert!(!outcome.degraded);
        assert!(outcome.id.is_some());

        let rows = catalog.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].filename, "cat.png");
        assert_eq!(rows[0].public_id.as_deref(), Some("images/cat.png"));
    }

    #[tokio::test]
    async fn oversized_and_bmp_rejected_before_network() {
        let host = Arc::new(FakeHost::default());
        let pipeline = pipeline(host.clone(), Arc::new(FakeCatalog::default()), false);

        let big = pipeline.upload_one(png("big.png", 6 * 1024 * 1024), None).await;
        assert!(matches!(big, Err(UploadError::Rejected(_))));

        let bmp = ImageFile::new("old.bmp", Some("image/bmp"), vec![1u8; 10]);
        assert!(matches!(pipeline.upload_one(bmp, None).await, Err(UploadError::Rejected(_))));

        assert!(host.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_degrades_to_placeholder() {
        let catalog = Arc::new(FakeCatalog::default());
        let pipeline = pipeline(Arc::new(FakeHost::default()), catalog.clone(), false);

        let outcome = pipeline.upload_one(png("fail.png", 10), Some("projects")).await.unwrap();
        assert!(outcome.degraded);
        assert_eq!(outcome.url, "https://placehold.co/800x600");
        assert_eq!(outcome.folder, "projects");
        assert!(outcome.id.is_none());
        assert!(catalog.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn metadata_failure_is_swallowed_by_default() {
        let host = Arc::new(FakeHost::default());
        let catalog = Arc::new(FakeCatalog { broken: true, ..Default::default() });
        let pipeline = pipeline(host.clone(), catalog, false);

        let outcome = pipeline.upload_one(png("cat.png", 10), None).await.unwrap();
        assert_eq!(outcome.url, "https://img.example.com/images/cat.png");
        assert!(outcome.id.is_none());
        assert!(host.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn strict_metadata_failure_removes_remote_image() {
        let host = Arc::new(FakeHost::default());
        let catalog = Arc::new(FakeCatalog { broken: true, ..Default::default() });
        let pipeline = pipeline(host.clone(), catalog, true);

        let result = pipeline.upload_one(png("cat.png", 10), None).await;
        assert!(matches!(result, Err(UploadError::OperationFailed(_))));
        assert_eq!(*host.deletes.lock().unwrap(), vec!["images/cat.png".to_string()]);
    }

    #[tokio::test]
    async fn batch_preserves_submission_order() {
        let host = Arc::new(FakeHost::default());
        let pipeline = pipeline(host.clone(), Arc::new(FakeCatalog::default()), false);

        // Smaller files finish later in the fake host
        let files = vec![png("a.png", 1), png("b.png", 10), png("c.png", 25)];
        let outcomes = pipeline.upload_many(files, None).await.unwrap();

        let urls: Vec<&str> = outcomes.iter().map(|o| o.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://img.example.com/images/a.png",
                "https://img.example.com/images/b.png",
                "https://img.example.com/images/c.png",
            ]
        );
    }

    #[tokio::test]
    async fn batch_degrades_individual_failures() {
        let pipeline = pipeline(Arc::new(FakeHost::default()), Arc::new(FakeCatalog::default()), false);

        let outcomes = pipeline
            .upload_many(vec![png("a.png", 5), png("fail.png", 5), png("c.png", 5)], Some("gallery"))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(!outcomes[0].degraded);
        assert!(outcomes[1].degraded);
        assert_eq!(outcomes[1].url, "https://placehold.co/800x600");
        assert!(!outcomes[2].degraded);
        assert!(outcomes.iter().all(|o| o.folder == "gallery"));
    }

    #[tokio::test]
    async fn batch_with_one_invalid_file_uploads_nothing() {
        let host = Arc::new(FakeHost::default());
        let pipeline = pipeline(host.clone(), Arc::new(FakeCatalog::default()), false);

        let bmp = ImageFile::new("old.bmp", Some("image/bmp"), vec![1u8; 10]);
        let result = pipeline.upload_many(vec![png("a.png", 5), bmp], None).await;
        assert!(matches!(result, Err(UploadError::Rejected(_))));
        assert!(host.uploads.lock().unwrap().is_empty());

        let too_many = (0..11).map(|i| png(&format!("{}.png", i), 5)).collect();
        assert!(matches!(pipeline.upload_many(too_many, None).await, Err(UploadError::Rejected(_))));
        assert!(matches!(pipeline.upload_many(Vec::new(), None).await, Err(UploadError::Rejected(_))));
    }

    #[tokio::test]
    async fn strict_batch_aborts_on_metadata_failure() {
        let catalog = Arc::new(FakeCatalog { broken: true, ..Default::default() });
        let pipeline = pipeline(Arc::new(FakeHost::default()), catalog, true);

        let result = pipeline.upload_many(vec![png("a.png", 5), png("b.png", 5)], None).await;
        assert!(matches!(result, Err(UploadError::OperationFailed(_))));
    }

    #[tokio::test]
    async fn strict_batch_failure_rolls_back_siblings() {
        let host = Arc::new(FakeHost::default());
        let catalog = Arc::new(FakeCatalog { refuse: Some("b.png"), ..Default::default() });
        let pipeline = pipeline(host.clone(), catalog.clone(), true);

        let files = vec![png("a.png", 5), png("b.png", 5), png("c.png", 20)];
        let result = pipeline.upload_many(files, None).await;
        assert!(matches!(result, Err(UploadError::OperationFailed(_))));

        // Every file was uploaded, then all three were removed again
        assert_eq!(host.uploads.lock().unwrap().len(), 3);
        assert!(catalog.rows.lock().unwrap().is_empty());
        let mut deletes = host.deletes.lock().unwrap().clone();
        deletes.sort();
        assert_eq!(deletes, vec!["images/a.png", "images/b.png", "images/c.png"]);
    }

    #[tokio::test]
    async fn best_effort_batch_keeps_siblings() {
        let host = Arc::new(FakeHost::default());
        let catalog = Arc::new(FakeCatalog { refuse: Some("b.png"), ..Default::default() });
        let pipeline = pipeline(host.clone(), catalog.clone(), false);

        let outcomes = pipeline.upload_many(vec![png("a.png", 5), png("b.png", 5)], None).await.unwrap();
        assert!(outcomes[0].id.is_some());
        assert!(outcomes[1].id.is_none());
        assert_eq!(catalog.rows.lock().unwrap().len(), 1);
        assert!(host.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_continues_past_remote_failure() {
        let host = Arc::new(FakeHost { fail_deletes: true, ..Default::default() });
        let catalog = Arc::new(FakeCatalog::default());
        let pipeline = pipeline(host.clone(), catalog.clone(), false);

        let outcome = pipeline.upload_one(png("cat.png", 10), None).await.unwrap();
        let id = outcome.id.unwrap();

        let removed = pipeline.delete(&id).await.unwrap();
        assert_eq!(removed.filename, "cat.png");
        assert_eq!(*host.deletes.lock().unwrap(), vec!["images/cat.png".to_string()]);
        assert!(catalog.rows.lock().unwrap().is_empty());

        assert!(matches!(pipeline.delete(&id).await, Err(UploadError::NotFound)));
        assert!(matches!(pipeline.delete("garbage").await, Err(UploadError::NotFound)));
    }

    #[tokio::test]
    async fn list_filters_by_folder() {
        let pipeline = pipeline(Arc::new(FakeHost::default()), Arc::new(FakeCatalog::default()), false);
        pipeline.upload_one(png("a.png", 5), Some("one")).await.unwrap();
        pipeline.upload_one(png("b.png", 5), Some("two")).await.unwrap();

        assert_eq!(pipeline.list(Some("one")).await.unwrap().len(), 1);
        assert_eq!(pipeline.list(None).await.unwrap().len(), 2);
    }
}
