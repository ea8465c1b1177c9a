pub mod article;
pub mod image;
pub mod portfolio;
pub mod profile;

pub use article::{Article, NewComment};
pub use image::ImageMetadata;
pub use portfolio::{update_fields, PortfolioInput};
pub use profile::{OwnerProfile, ProfilePatch};
