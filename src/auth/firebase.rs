use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::{AuthError, AuthUser, Claims, TokenVerifier};
use crate::config::AuthConfig;

/// Floor between key fetches triggered by an unknown `kid`
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Firebase ID tokens: RS256, signed by one of Google's published
/// keys, audience = project id, issuer = securetoken for that project.
pub struct FirebaseVerifier {
    client: reqwest::Client,
    project_id: Option<String>,
    jwks_url: String,
    cache_ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            project_id: config.project_id.clone(),
            jwks_url: config.jwks_url.clone(),
            cache_ttl: Duration::from_secs(config.key_cache_secs),
            cache: RwLock::new(None),
        }
    }

    fn issuer(project_id: &str) -> String {
        format!("https://securetoken.google.com/{}", project_id)
    }

    /// Signing key for `kid`. The key set is refetched when it is stale, or
    /// when it does not know the key (Google rotates keys) and the last fetch
    /// is older than `MIN_REFETCH_INTERVAL`.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(found) = self.cached_key(kid, &*self.cache.read().await) {
            return found;
        }

        // Fetches are serialized; a request that waited here may find the
        // set already refreshed by the one before it
        let mut cache = self.cache.write().await;
        if let Some(found) = self.cached_key(kid, &cache) {
            return found;
        }

        let keys = self.fetch_keys().await?;
        let key = lookup(&keys, kid);
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        key
    }

    /// Answer from the cache, or `None` when a fetch is needed
    fn cached_key(&self, kid: &str, cache: &Option<CachedKeys>) -> Option<Result<DecodingKey, AuthError>> {
        let cached = cache.as_ref()?;
        let age = cached.fetched_at.elapsed();
        if age >= self.cache_ttl {
            return None;
        }
        match cached.keys.find(kid) {
            Some(_) => Some(lookup(&cached.keys, kid)),
            None if age < MIN_REFETCH_INTERVAL => Some(Err(AuthError::UnknownKey(kid.to_string()))),
            None => None,
        }
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        info!("Fetched {} token signing key(s)", keys.keys.len());
        Ok(keys)
    }
}

fn lookup(keys: &JwkSet, kid: &str) -> Result<DecodingKey, AuthError> {
    match keys.find(kid) {
        Some(jwk) => DecodingKey::from_jwk(jwk).map_err(|e| AuthError::InvalidToken(e.to_string())),
        None => Err(AuthError::UnknownKey(kid.to_string())),
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let project_id = self.project_id.as_deref().ok_or(AuthError::NotConfigured)?;

        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!("unexpected algorithm {:?}", header.alg)));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[Self::issuer(project_id)]);

        let claims = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }
        Ok(AuthUser::from(claims))
    }
}
