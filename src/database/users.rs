use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, DateTime, Document},
    Collection, Database,
};

use crate::database::error::StoreError;

/// User documents are written by the identity flow elsewhere; this store
/// only reads them and seeds a placeholder.
#[derive(Clone)]
pub struct UserStore {
    collection: Collection<Document>,
}

impl UserStore {
    pub const COLLECTION: &'static str = "users";
    pub const PLACEHOLDER_UID: &'static str = "placeholder-user";

    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(Self::COLLECTION),
        }
    }

    pub async fn list(&self) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection.find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn get_one(&self, uid: &str) -> Result<Document, StoreError> {
        self.collection
            .find_one(doc! { "uid": uid }, None)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("User '{}'", uid)))
    }

    pub async fn seed_if_empty(&self) -> Result<bool, StoreError> {
        if self.collection.count_documents(None, None).await? > 0 {
            return Ok(false);
        }

        self.collection
            .insert_one(
                doc! {
                    "uid": Self::PLACEHOLDER_UID,
                    "name": "Placeholder User",
                    "email": Bson::Null,
                    "createdAt": DateTime::now(),
                },
                None,
            )
            .await?;
        Ok(true)
    }
}
