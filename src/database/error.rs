use thiserror::Error;

/// Failures surfaced by the record stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Voter id is required")]
    Unauthenticated,

    #[error("You have already upvoted this article")]
    AlreadyVoted,

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Database operation failed: {0}")]
    OperationFailed(#[from] mongodb::error::Error),

    #[error("Document mapping failed: {0}")]
    Mapping(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        StoreError::Mapping(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for StoreError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        StoreError::Mapping(err.to_string())
    }
}
