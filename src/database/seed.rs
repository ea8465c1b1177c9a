use serde::Serialize;
use tracing::info;

use crate::database::error::StoreError;
use crate::database::{ArticleStore, ProfileStore, UserStore};

/// What a seeding pass created. All zero / false on an already seeded database.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SeedReport {
    pub articles: u64,
    pub users: bool,
    pub profile: bool,
}

pub async fn run(
    articles: &ArticleStore,
    users: &UserStore,
    profile: &ProfileStore,
) -> Result<SeedReport, StoreError> {
    let report = SeedReport {
        articles: articles.seed_if_empty().await?,
        users: users.seed_if_empty().await?,
        profile: profile.seed_if_empty().await?,
    };

    info!(
        "Seeding finished: {} article(s), placeholder user: {}, profile: {}",
        report.articles, report.users, report.profile
    );
    Ok(report)
}
