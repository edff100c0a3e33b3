//! # Gallery Shared
//!
//! Request and response types of the art gallery HTTP API.
//! Kept free of domain and storage crates so clients can depend on it alone.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
