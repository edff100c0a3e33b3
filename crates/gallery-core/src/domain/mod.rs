//! Domain entities - the core business objects.

mod art_post;
mod review;

pub use art_post::{ArtPost, ArtPostDraft, ArtPostFields, Statistics, SubjectInput};
pub use review::{Review, ReviewDraft, ReviewFields};
