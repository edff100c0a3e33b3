//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use gallery_core::{ServicePolicy, ValidationPolicy};
use gallery_infra::database::DatabaseConfig;
#[cfg(feature = "mongo")]
use gallery_infra::document::MongoConfig;

/// Raised when an environment variable holds a value we cannot use.
#[derive(Debug, thiserror::Error)]
#[error("invalid value `{value}` for {key}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

/// Which store backs the art posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Postgres when `DATABASE_URL` is set, else Mongo when `MONGO_URL` is
    /// set, else in-memory.
    Auto,
    Memory,
    Postgres,
    Mongo,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(StorageBackend::Auto),
            "memory" => Ok(StorageBackend::Memory),
            "postgres" => Ok(StorageBackend::Postgres),
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StorageBackend,
    pub database: Option<DatabaseConfig>,
    pub mongo_url: Option<String>,
    pub mongo_database: String,
    pub policy: ServicePolicy,
}

/// Read `key` and parse it, falling back to `default` when unset.
fn parsed<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = env::var("DATABASE_URL")
            .ok()
            .map(|url| -> Result<DatabaseConfig, ConfigError> {
                Ok(DatabaseConfig {
                    url,
                    max_connections: parsed("DB_MAX_CONNECTIONS", 100)?,
                    min_connections: parsed("DB_MIN_CONNECTIONS", 10)?,
                })
            })
            .transpose()?;

        let policy = ServicePolicy {
            validation: parsed("VALIDATION_MODE", ValidationPolicy::Strict)?,
            restamp_on_edit: parsed("RESTAMP_POST_DATE_ON_EDIT", true)?,
            operation_timeout: Duration::from_millis(parsed("OPERATION_TIMEOUT_MS", 5000)?),
            max_write_retries: parsed("MAX_WRITE_RETRIES", 3)?,
            others_limit: parsed("OTHERS_LIMIT", 12)?,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080)?,
            backend: parsed("STORAGE_BACKEND", StorageBackend::Auto)?,
            database,
            mongo_url: env::var("MONGO_URL").ok(),
            mongo_database: env::var("MONGO_DATABASE").unwrap_or_else(|_| "artgallery".to_string()),
            policy,
        })
    }

    /// Resolve `Auto` against the connection settings that are present.
    pub fn resolved_backend(&self) -> StorageBackend {
        match self.backend {
            StorageBackend::Auto if self.database.is_some() => StorageBackend::Postgres,
            StorageBackend::Auto if self.mongo_url.is_some() => StorageBackend::Mongo,
            StorageBackend::Auto => StorageBackend::Memory,
            explicit => explicit,
        }
    }

    #[cfg(feature = "mongo")]
    pub fn mongo(&self) -> Option<MongoConfig> {
        self.mongo_url.as_ref().map(|url| MongoConfig {
            url: url.clone(),
            database: self.mongo_database.clone(),
        })
    }
}
