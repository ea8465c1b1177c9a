use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub image_host: ImageHostConfig,
    pub upload: UploadConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    /// Used when the connection string does not name a database
    pub name: String,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub project_id: Option<String>,
    /// Raw service-account JSON, only read for its `project_id`
    #[serde(skip_serializing)]
    pub credentials_json: Option<String>,
    pub jwks_url: String,
    pub key_cache_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageHostConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_bytes: usize,
    pub max_files: usize,
    pub default_folder: String,
    pub placeholder_url: String,
    pub strict_metadata: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("PORTFOLIO_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("MONGODB_URI") {
            self.database.uri = v;
        }
        if let Ok(v) = env::var("MONGODB_DB") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("MONGODB_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        // Auth overrides
        if let Ok(v) = env::var("FIREBASE_CREDENTIALS") {
            if !v.trim().is_empty() {
                self.auth.credentials_json = Some(v);
            }
        }
        if let Ok(v) = env::var("FIREBASE_PROJECT_ID") {
            if !v.trim().is_empty() {
                self.auth.project_id = Some(v);
            }
        }
        if self.auth.project_id.is_none() {
            self.auth.project_id = self
                .auth
                .credentials_json
                .as_deref()
                .and_then(project_id_from_credentials);
        }
        if let Ok(v) = env::var("FIREBASE_JWKS_URL") {
            self.auth.jwks_url = v;
        }
        if let Ok(v) = env::var("AUTH_KEY_CACHE_SECS") {
            self.auth.key_cache_secs = v.parse().unwrap_or(self.auth.key_cache_secs);
        }

        // Image host overrides
        if let Ok(v) = env::var("CLOUDINARY_BASE_URL") {
            self.image_host.base_url = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_CLOUD_NAME") {
            self.image_host.cloud_name = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_KEY") {
            self.image_host.api_key = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_SECRET") {
            self.image_host.api_secret = v;
        }
        if let Ok(v) = env::var("IMAGE_HOST_TIMEOUT_SECS") {
            self.image_host.timeout_secs = v.parse().unwrap_or(self.image_host.timeout_secs);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_MAX_FILE_BYTES") {
            self.upload.max_file_bytes = v.parse().unwrap_or(self.upload.max_file_bytes);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_FILES") {
            self.upload.max_files = v.parse().unwrap_or(self.upload.max_files);
        }
        if let Ok(v) = env::var("UPLOAD_DEFAULT_FOLDER") {
            self.upload.default_folder = v;
        }
        if let Ok(v) = env::var("UPLOAD_PLACEHOLDER_URL") {
            self.upload.placeholder_url = v;
        }
        if let Ok(v) = env::var("UPLOAD_STRICT_METADATA") {
            self.upload.strict_metadata = v.parse().unwrap_or(self.upload.strict_metadata);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn base() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8000 },
            database: DatabaseConfig {
                uri: "mongodb://127.0.0.1:27017".to_string(),
                name: "portfolio".to_string(),
                connect_timeout_secs: 10,
            },
            auth: AuthConfig {
                project_id: None,
                credentials_json: None,
                jwks_url: DEFAULT_JWKS_URL.to_string(),
                key_cache_secs: 60 * 60,
            },
            image_host: ImageHostConfig {
                base_url: "https://api.cloudinary.com/v1_1/".to_string(),
                cloud_name: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
                timeout_secs: 30,
            },
            upload: UploadConfig {
                max_file_bytes: 5 * 1024 * 1024, // 5MB
                max_files: 10,
                default_folder: "images".to_string(),
                placeholder_url: "https://placehold.co/800x600?text=Image+unavailable".to_string(),
                strict_metadata: false,
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    fn development() -> Self {
        let mut config = Self::base();
        config.security.cors_origins = vec![
            "http://localhost:3000".to_string(),
            "http://localhost:5173".to_string(),
        ];
        config
    }

    fn staging() -> Self {
        let mut config = Self::base();
        config.environment = Environment::Staging;
        config.database.connect_timeout_secs = 5;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::base();
        config.environment = Environment::Production;
        config.database.connect_timeout_secs = 5;
        config.image_host.timeout_secs = 20;
        config.upload.strict_metadata = true;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }

    /// Largest request body accepted on upload routes. Leaves headroom above
    /// the per-file cap so oversized files reach the pipeline's own check.
    pub fn upload_body_limit(&self) -> usize {
        self.upload.max_files * self.upload.max_file_bytes + 1024 * 1024
    }
}

fn project_id_from_credentials(raw: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("FIREBASE_CREDENTIALS is not valid JSON: {}", e);
            return None;
        }
    };
    value
        .get("project_id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
