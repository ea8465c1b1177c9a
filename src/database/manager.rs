use std::time::Duration;

use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database connection string: {0}")]
    InvalidUri(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Owns the process-wide MongoDB client. Stores receive clones of the
/// `Database` handle, which share the client's connection pool.
pub struct DatabaseManager {
    client: Client,
    database: Database,
}

impl DatabaseManager {
    const APP_NAME: &'static str = "portfolio-api";

    /// Parse the connection string and build the client. The driver connects
    /// lazily, so this does not fail when the server is unreachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| DatabaseError::InvalidUri(e.to_string()))?;

        let timeout = Duration::from_secs(config.connect_timeout_secs);
        options.app_name = Some(Self::APP_NAME.to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let database_name = Self::database_name(options.default_database.as_deref(), &config.name);
        let client = Client::with_options(options)?;
        let database = client.database(&database_name);

        info!("Using MongoDB database: {}", database_name);
        Ok(Self { client, database })
    }

    /// A database named in the connection string wins over the configured name
    fn database_name(from_uri: Option<&str>, configured: &str) -> String {
        match from_uri {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => configured.to_string(),
        }
    }

    pub fn database(&self) -> Database {
        self.database.clone()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Round-trips a ping to the server
    pub async fn health_check(database: &Database) -> Result<(), DatabaseError> {
        database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("Closed MongoDB client");
    }
}
