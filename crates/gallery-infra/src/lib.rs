//! # Gallery Infrastructure
//!
//! Concrete implementations of the storage ports defined in `gallery-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All backends enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL via SeaORM, optimistic versioned writes
//! - `mongo` - MongoDB, native single-document atomic updates

pub mod database;
pub mod memory;

#[cfg(feature = "mongo")]
pub mod document;

// Re-exports - In-Memory
pub use memory::InMemoryArtPostStore;

pub use database::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use database::PostgresArtPostRepository;

#[cfg(feature = "mongo")]
pub use document::{MongoArtPostRepository, MongoConfig};
