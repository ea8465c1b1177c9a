use std::sync::Arc;

use mongodb::Database;

use crate::auth::TokenVerifier;
use crate::database::{ArticleStore, ImageStore, PortfolioStore, ProfileStore, UserStore};
use crate::upload::{ImageHost, UploadPipeline, UploadPolicy};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub articles: ArticleStore,
    pub portfolios: PortfolioStore,
    pub users: UserStore,
    pub profile: ProfileStore,
    pub uploads: Arc<UploadPipeline>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(
        db: Database,
        verifier: Arc<dyn TokenVerifier>,
        host: Arc<dyn ImageHost>,
        policy: UploadPolicy,
    ) -> Self {
        let catalog = Arc::new(ImageStore::new(&db));
        Self {
            articles: ArticleStore::new(&db),
            portfolios: PortfolioStore::new(&db),
            users: UserStore::new(&db),
            profile: ProfileStore::new(&db),
            uploads: Arc::new(UploadPipeline::new(host, catalog, policy)),
            verifier,
            db,
        }
    }
}
