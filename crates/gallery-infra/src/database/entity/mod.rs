//! SeaORM entities.

pub mod art_post;
