//! # Gallery Core
//!
//! The domain layer of the art gallery API.
//! Art posts own their reviews; every write against a post is expressed as a
//! single atomic operation on that post, so the review counter can never drift
//! from the embedded review list. This crate holds the entities, the storage
//! ports, the query builder and the services that enforce those rules.

pub mod domain;
pub mod error;
pub mod ports;
pub mod query;
pub mod services;

pub use error::{DomainError, RepoError};
pub use query::ArtQuery;
pub use services::{ArtPostService, ReviewService, ServicePolicy, ValidationPolicy};
