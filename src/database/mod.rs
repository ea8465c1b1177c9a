pub mod articles;
pub mod error;
pub mod identity;
pub mod images;
pub mod manager;
pub mod models;
pub mod portfolios;
pub mod profile;
pub mod seed;
pub mod users;

pub use articles::ArticleStore;
pub use error::StoreError;
pub use identity::{slugify, PortfolioKey};
pub use images::ImageStore;
pub use manager::{DatabaseError, DatabaseManager};
pub use portfolios::PortfolioStore;
pub use profile::ProfileStore;
pub use users::UserStore;
