use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::FindOptions,
    Collection, Database,
};

use crate::database::error::StoreError;
use crate::database::models::ImageMetadata;
use crate::upload::ImageCatalog;

/// Metadata index for uploaded images
#[derive(Clone)]
pub struct ImageStore {
    collection: Collection<ImageMetadata>,
}

impl ImageStore {
    pub const COLLECTION: &'static str = "images";

    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(Self::COLLECTION),
        }
    }
}

fn folder_filter(folder: Option<&str>) -> Option<Document> {
    match folder.map(str::trim) {
        Some(folder) if !folder.is_empty() => Some(doc! { "folder": folder }),
        _ => None,
    }
}

#[async_trait]
impl ImageCatalog for ImageStore {
    async fn record(&self, mut metadata: ImageMetadata) -> Result<ImageMetadata, StoreError> {
        metadata.id = None;
        let result = self.collection.insert_one(&metadata, None).await?;
        metadata.id = result.inserted_id.as_object_id();
        Ok(metadata)
    }

    async fn find(&self, id: &str) -> Result<Option<ImageMetadata>, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.collection.find_one(doc! { "_id": oid }, None).await?)
    }

    async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list(&self, folder: Option<&str>) -> Result<Vec<ImageMetadata>, StoreError> {
        let options = FindOptions::builder().sort(doc! { "uploadedAt": -1 }).build();
        let cursor = self.collection.find(folder_filter(folder), options).await?;
        Ok(cursor.try_collect().await?)
    }
}
