//! PostgreSQL storage via SeaORM.
//!
//! Reviews are kept as a JSONB array on the post row. Review writes are
//! read-modify-write guarded by a `version` column.

#[cfg(feature = "postgres")]
mod connections;

#[cfg(feature = "postgres")]
pub mod entity;

#[cfg(feature = "postgres")]
mod postgres_repo;

#[cfg(feature = "postgres")]
pub use connections::connect;

#[cfg(feature = "postgres")]
pub use postgres_repo::PostgresArtPostRepository;


/// Configuration for the PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}
