//! Domain-level error types.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business logic failures surfaced to callers.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "not_found",
            DomainError::Validation(_) => "validation",
            DomainError::Conflict(_) => "conflict",
            DomainError::Timeout(_) => "timeout",
            DomainError::Storage(_) => "storage",
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// The document changed between read and write.
    #[error("Concurrent modification detected")]
    Conflict,
}

impl RepoError {
    /// Attach the entity being addressed so a miss becomes a typed `NotFound`.
    pub fn for_entity(self, entity_type: &'static str, id: Uuid) -> DomainError {
        match self {
            RepoError::NotFound => DomainError::NotFound { entity_type, id },
            RepoError::Conflict => DomainError::Conflict(format!(
                "{entity_type} {id} was modified concurrently"
            )),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Storage(msg),
        }
    }
}
