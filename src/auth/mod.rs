pub mod firebase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use firebase::FirebaseVerifier;

/// ID-token claims we rely on. Firebase puts the user id in `sub`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Verified identity attached to the request by the auth middleware
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token verification is not configured")]
    NotConfigured,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Could not fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("Unknown signing key: {0}")]
    UnknownKey(String),
}

/// Checks an identity token issued by the external provider
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}
