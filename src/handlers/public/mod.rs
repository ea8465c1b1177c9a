// handlers/public/mod.rs - Read-only handlers, no authentication required
pub mod articles;
pub mod images;
pub mod portfolios;
pub mod profile;
pub mod users;
