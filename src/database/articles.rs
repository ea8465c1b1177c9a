use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument, UpdateOptions},
    Collection, Database,
};

use crate::database::error::StoreError;
use crate::database::models::Article;

/// Articles are addressed by `name` and never deleted
#[derive(Clone)]
pub struct ArticleStore {
    collection: Collection<Article>,
}

impl ArticleStore {
    pub const COLLECTION: &'static str = "articles";
    pub const SEED_NAMES: [&'static str; 3] = ["learn-react", "learn-node", "mongodb"];

    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(Self::COLLECTION),
        }
    }

    pub async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let cursor = self.collection.find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn get_one(&self, name: &str) -> Result<Article, StoreError> {
        self.collection
            .find_one(doc! { "name": name }, None)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("Article '{}'", name)))
    }

    /// Count one vote per voter. The membership check and the increment are
    /// one conditional update, so concurrent requests from the same voter
    /// cannot both succeed.
    pub async fn upvote(&self, name: &str, voter_id: Option<&str>) -> Result<Article, StoreError> {
        let voter_id = match voter_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(StoreError::Unauthenticated),
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(upvote_filter(name, voter_id), upvote_update(voter_id), options)
            .await?;

        match updated {
            Some(article) => Ok(article),
            None => {
                // Nothing matched: either the article is missing or this voter is already in the set
                let exists = self.collection.count_documents(doc! { "name": name }, None).await? > 0;
                if exists {
                    Err(StoreError::AlreadyVoted)
                } else {
                    Err(StoreError::not_found(format!("Article '{}'", name)))
                }
            }
        }
    }

    pub async fn add_comment(&self, name: &str, text: &str) -> Result<Article, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(
                doc! { "name": name },
                doc! { "$push": { "comments": text } },
                options,
            )
            .await?
            .ok_or_else(|| StoreError::not_found(format!("Article '{}'", name)))
    }

    /// Insert any default article that is missing. Returns how many were created.
    pub async fn seed_if_empty(&self) -> Result<u64, StoreError> {
        let options = UpdateOptions::builder().upsert(true).build();
        let mut inserted = 0;

        for name in Self::SEED_NAMES {
            let mut defaults = bson::to_document(&Article::seed(name))?;
            defaults.remove("name");

            let result = self
                .collection
                .update_one(
                    doc! { "name": name },
                    doc! { "$setOnInsert": defaults },
                    options.clone(),
                )
                .await?;

            if result.upserted_id.is_some() {
                inserted += 1;
            }
        }

        Ok(inserted)
    }
}

fn upvote_filter(name: &str, voter_id: &str) -> Document {
    doc! { "name": name, "upvoteIds": { "$ne": voter_id } }
}

fn upvote_update(voter_id: &str) -> Document {
    doc! {
        "$inc": { "upvotes": 1 },
        "$push": { "upvoteIds": voter_id },
    }
}
