//! Use-case services - the operations exposed to the HTTP surface.

mod art_posts;
mod policy;
mod reviews;

pub use art_posts::ArtPostService;
pub use policy::{ServicePolicy, ValidationPolicy};
pub use reviews::ReviewService;
