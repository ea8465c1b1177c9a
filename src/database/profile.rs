use mongodb::{
    bson::{self, doc, Bson, DateTime},
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
    Collection, Database,
};

use crate::database::error::StoreError;
use crate::database::models::{OwnerProfile, ProfilePatch};

/// Singleton owner profile; there is never more than one document
#[derive(Clone)]
pub struct ProfileStore {
    collection: Collection<OwnerProfile>,
}

impl ProfileStore {
    pub const COLLECTION: &'static str = "profile";

    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(Self::COLLECTION),
        }
    }

    pub async fn get(&self) -> Result<OwnerProfile, StoreError> {
        self.collection
            .find_one(None, None)
            .await?
            .ok_or_else(|| StoreError::not_found("Profile"))
    }

    /// Merge the provided fields into the existing profile. Never creates one.
    pub async fn update(&self, patch: ProfilePatch) -> Result<OwnerProfile, StoreError> {
        let mut fields = bson::to_document(&patch)?;
        fields.insert("updatedAt", Bson::DateTime(DateTime::now()));

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .upsert(false)
            .build();

        self.collection
            .find_one_and_update(doc! {}, doc! { "$set": fields }, options)
            .await?
            .ok_or_else(|| StoreError::not_found("Profile"))
    }

    /// Create the placeholder profile when none exists. The empty-filter
    /// upsert matches any existing profile, so repeated calls are no-ops.
    pub async fn seed_if_empty(&self) -> Result<bool, StoreError> {
        let defaults = bson::to_document(&OwnerProfile::placeholder(DateTime::now()))?;
        let options = UpdateOptions::builder().upsert(true).build();

        let result = self
            .collection
            .update_one(doc! {}, doc! { "$setOnInsert": defaults }, options)
            .await?;

        Ok(result.upserted_id.is_some())
    }
}
