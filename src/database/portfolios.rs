use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, DateTime, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection, Database,
};
use serde_json::{Map, Value};

use crate::database::error::StoreError;
use crate::database::identity::PortfolioKey;
use crate::database::models::{update_fields, PortfolioInput};

/// Portfolio items keep arbitrary client fields, so they are handled as raw
/// documents rather than a fixed struct.
#[derive(Clone)]
pub struct PortfolioStore {
    collection: Collection<Document>,
}

impl PortfolioStore {
    pub const COLLECTION: &'static str = "portfolios";

    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(Self::COLLECTION),
        }
    }

    pub async fn list(&self) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn get_one(&self, key: &PortfolioKey) -> Result<Document, StoreError> {
        self.locate(key)
            .await?
            .ok_or_else(|| not_found(key))
    }

    pub async fn create(&self, input: PortfolioInput) -> Result<Document, StoreError> {
        if input.title.trim().is_empty() {
            return Err(StoreError::Invalid("title must not be empty".to_string()));
        }

        let mut document = input.into_document(DateTime::now())?;
        let result = self.collection.insert_one(&document, None).await?;
        document.insert("_id", result.inserted_id);
        Ok(document)
    }

    pub async fn update(&self, key: &PortfolioKey, body: Map<String, Value>) -> Result<Document, StoreError> {
        let fields = update_fields(body, DateTime::now())?;
        let id = self.locate_id(key).await?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields }, options)
            .await?
            .ok_or_else(|| not_found(key))
    }

    pub async fn delete(&self, key: &PortfolioKey) -> Result<ObjectId, StoreError> {
        let id = self.locate_id(key).await?;
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(not_found(key));
        }
        Ok(id)
    }

    /// First document matching the key's filters, tried in precedence order
    async fn locate(&self, key: &PortfolioKey) -> Result<Option<Document>, StoreError> {
        for filter in key.candidate_filters() {
            if let Some(found) = self.collection.find_one(filter, None).await? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    async fn locate_id(&self, key: &PortfolioKey) -> Result<ObjectId, StoreError> {
        if let PortfolioKey::ObjectId(oid) = key {
            return Ok(*oid);
        }
        let found = self.locate(key).await?.ok_or_else(|| not_found(key))?;
        match found.get("_id") {
            Some(Bson::ObjectId(oid)) => Ok(*oid),
            _ => Err(StoreError::Mapping(format!(
                "portfolio '{}' has a non-ObjectId _id",
                key.as_str()
            ))),
        }
    }
}

fn not_found(key: &PortfolioKey) -> StoreError {
    StoreError::not_found(format!("Portfolio '{}'", key.as_str()))
}
