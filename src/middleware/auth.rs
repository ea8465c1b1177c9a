use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

pub use crate::auth::AuthUser;

/// Header carrying the identity provider's ID token
pub const AUTH_HEADER: &str = "authtoken";

/// Verifies the `authtoken` header and injects the caller's `AuthUser`.
/// Any missing, malformed or rejected token is a 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers()).map_err(ApiError::unauthorized)?;

    let user = state.verifier.verify(&token).await?;
    tracing::debug!("Authenticated request from {}", user.uid);

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Read the raw token from the `authtoken` header. A `Bearer ` prefix is
/// tolerated.
pub fn extract_token(headers: &HeaderMap) -> Result<String, String> {
    let value = headers
        .get(AUTH_HEADER)
        .ok_or_else(|| "Missing authtoken header".to_string())?;

    let raw = value
        .to_str()
        .map_err(|_| "Invalid authtoken header format".to_string())?
        .trim();

    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err("Empty authtoken header".to_string());
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn reads_raw_token() {
        assert_eq!(extract_token(&headers("abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn tolerates_bearer_prefix() {
        assert_eq!(extract_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_or_blank_header_is_rejected() {
        assert!(extract_token(&HeaderMap::new()).is_err());
        assert!(extract_token(&headers("   ")).is_err());
    }

    #[test]
    fn authorization_header_is_not_used() {
        let mut map = HeaderMap::new();
        map.insert("authorization", HeaderValue::from_static("Bearer abc"));
        assert!(extract_token(&map).is_err());
    }
}
