use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbConn};

use gallery_core::error::RepoError;

use super::DatabaseConfig;

/// Open the connection pool. Failing here is fatal for the caller.
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, RepoError> {
    tracing::info!("Initializing database connection...");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .to_owned();

    let conn = Database::connect(opts)
        .await
        .map_err(|e| RepoError::Connection(e.to_string()))?;

    tracing::info!("Database connected (pool: {})", config.max_connections);
    Ok(conn)
}
