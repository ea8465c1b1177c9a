pub mod auth;
pub mod response;

pub use auth::{require_auth, AuthUser, AUTH_HEADER};
pub use response::{ApiResponse, ApiResult};
