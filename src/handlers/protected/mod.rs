// handlers/protected/mod.rs - Mutating handlers behind `require_auth`
//
// Every route here runs after the auth middleware, so `Extension<AuthUser>`
// is always present.
pub mod articles;
pub mod portfolios;
pub mod profile;
pub mod uploads;
