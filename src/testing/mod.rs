use std::io::Write;
use std::sync::Once;

use mongodb::{Client, Database};
use uuid::Uuid;

static SKIP_NOTICE: Once = Once::new();

/// `MONGODB_URI` when set to something other than blanks
fn configured_uri(value: Option<String>) -> Option<String> {
    value.filter(|uri| !uri.trim().is_empty())
}

/// Printed once per test binary. Writes to the raw stderr handle, which the
/// test harness does not capture, so the skip shows up in passing runs too.
fn announce_skip(reason: &str) {
    SKIP_NOTICE.call_once(|| {
        let _ = writeln!(
            std::io::stderr(),
            "NOTE: database-backed tests are being SKIPPED ({}). \
             Set MONGODB_URI=mongodb://localhost:27017 to run them.",
            reason
        );
    });
}

/// Per-test MongoDB database with a unique name, dropped on cleanup
pub struct TestContext {
    client: Client,
    pub database: Database,
}

impl TestContext {
    /// Connects to `MONGODB_URI` and pings it. Returns `None` when the
    /// variable is unset or the server is unreachable, so DB-backed tests
    /// pass vacuously on machines without MongoDB. A one-time notice on
    /// stderr says so.
    pub async fn connect() -> Option<Self> {
        let Some(uri) = configured_uri(std::env::var("MONGODB_URI").ok()) else {
            announce_skip("MONGODB_URI is not set");
            return None;
        };

        let ctx = match Self::build(&uri).await {
            Ok(ctx) => ctx,
            Err(e) => {
                announce_skip(&format!("MONGODB_URI is not usable: {}", e));
                return None;
            }
        };

        match crate::database::DatabaseManager::health_check(&ctx.database).await {
            Ok(()) => Some(ctx),
            Err(e) => {
                announce_skip(&format!("MongoDB is unreachable: {}", e));
                None
            }
        }
    }

    /// Context whose client never talks to a server unless an operation is
    /// issued. For tests that must fail before reaching the database.
    pub async fn lazy() -> Self {
        Self::build("mongodb://127.0.0.1:27017")
            .await
            .expect("a plain mongodb:// URI parses without network access")
    }

    async fn build(uri: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(&Self::generate_database_name());
        Ok(Self { client, database })
    }

    fn generate_database_name() -> String {
        format!("test_{}", Uuid::new_v4().simple())
    }

    pub async fn cleanup(self) {
        if let Err(e) = self.database.drop(None).await {
            println!("Failed to drop test database {}: {}", self.database.name(), e);
        }
        self.client.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_names_are_unique() {
        let name1 = TestContext::generate_database_name();
        let name2 = TestContext::generate_database_name();

        assert_ne!(name1, name2);
        assert!(name1.starts_with("test_"));
        // MongoDB caps database names at 64 bytes
        assert!(name1.len() < 64);
    }

    #[test]
    fn blank_uri_counts_as_unset() {
        assert_eq!(configured_uri(None), None);
        assert_eq!(configured_uri(Some("   ".to_string())), None);
        assert_eq!(
            configured_uri(Some("mongodb://db:27017".to_string())).as_deref(),
            Some("mongodb://db:27017")
        );
    }
}
