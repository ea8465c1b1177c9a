// handlers/mod.rs - Route handlers grouped by access level
//
// Public (no token) -> Protected (valid `authtoken` header required)
pub mod protected;
pub mod public;
