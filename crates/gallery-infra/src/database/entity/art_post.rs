//! Art post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use gallery_core::domain::{ArtPost, Review, Statistics};
use gallery_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "art_posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_date: DateTimeWithTimeZone,
    pub poster_name: String,
    pub image_ref: String,
    pub title: String,
    pub art_type: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Subject tags, a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub subjects: Json,
    pub review_count: i64,
    pub like_count: i64,
    /// Embedded reviews in insertion order.
    #[sea_orm(column_type = "JsonBinary")]
    pub reviews: Json,
    /// Bumped on every write; review writes only land on the version they read.
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Counters are stored as BIGINT; anything outside `u32` is clamped.
pub(crate) fn counter(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

pub(crate) fn decode_reviews(reviews: Json) -> Result<Vec<Review>, RepoError> {
    serde_json::from_value(reviews).map_err(|e| RepoError::Query(format!("bad reviews column: {e}")))
}

pub(crate) fn encode<T: serde::Serialize>(value: &T) -> Result<Json, RepoError> {
    serde_json::to_value(value).map_err(|e| RepoError::Query(e.to_string()))
}

/// Conversion from SeaORM Model to Domain ArtPost.
impl TryFrom<Model> for ArtPost {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let subjects = serde_json::from_value(model.subjects)
            .map_err(|e| RepoError::Query(format!("bad subjects column: {e}")))?;

        Ok(Self {
            id: model.id,
            post_date: model.post_date.into(),
            poster_name: model.poster_name,
            image_ref: model.image_ref,
            title: model.title,
            art_type: model.art_type,
            description: model.description,
            subjects,
            statistics: Statistics {
                review_count: counter(model.review_count),
                like_count: counter(model.like_count),
            },
            reviews: decode_reviews(model.reviews)?,
        })
    }
}

/// Conversion from Domain ArtPost to a fresh SeaORM ActiveModel.
impl TryFrom<&ArtPost> for ActiveModel {
    type Error = RepoError;

    fn try_from(post: &ArtPost) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Set(post.id),
            post_date: Set(post.post_date.into()),
            poster_name: Set(post.poster_name.clone()),
            image_ref: Set(post.image_ref.clone()),
            title: Set(post.title.clone()),
            art_type: Set(post.art_type.clone()),
            description: Set(post.description.clone()),
            subjects: Set(encode(&post.subjects)?),
            review_count: Set(i64::from(post.statistics.review_count)),
            like_count: Set(i64::from(post.statistics.like_count)),
            reviews: Set(encode(&post.reviews)?),
            version: Set(0),
        })
    }
}
