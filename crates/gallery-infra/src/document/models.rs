//! BSON document shapes for the `artposts` collection.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gallery_core::domain::{ArtPost, Review, Statistics};
use gallery_core::error::RepoError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ArtPostDocument {
    pub id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub post_date: DateTime<Utc>,
    pub poster_name: String,
    pub image_ref: String,
    pub title: String,
    #[serde(rename = "type")]
    pub art_type: String,
    pub description: String,
    pub subjects: Vec<String>,
    pub statistics: StatisticsDocument,
    pub reviews: Vec<ReviewDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatisticsDocument {
    pub review_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewDocument {
    pub id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub review_date: DateTime<Utc>,
    pub reviewer_name: String,
    pub text: String,
    pub liked_post: Option<bool>,
}

fn parse_id(raw: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(raw).map_err(|e| RepoError::Query(format!("bad id `{raw}`: {e}")))
}

fn counter(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

impl From<&Review> for ReviewDocument {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id.to_string(),
            review_date: review.review_date,
            reviewer_name: review.reviewer_name.clone(),
            text: review.text.clone(),
            liked_post: review.liked_post,
        }
    }
}

impl TryFrom<ReviewDocument> for Review {
    type Error = RepoError;

    fn try_from(doc: ReviewDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&doc.id)?,
            review_date: doc.review_date,
            reviewer_name: doc.reviewer_name,
            text: doc.text,
            liked_post: doc.liked_post,
        })
    }
}

impl From<&ArtPost> for ArtPostDocument {
    fn from(post: &ArtPost) -> Self {
        Self {
            id: post.id.to_string(),
            post_date: post.post_date,
            poster_name: post.poster_name.clone(),
            image_ref: post.image_ref.clone(),
            title: post.title.clone(),
            art_type: post.art_type.clone(),
            description: post.description.clone(),
            subjects: post.subjects.clone(),
            statistics: StatisticsDocument {
                review_count: i64::from(post.statistics.review_count),
                like_count: i64::from(post.statistics.like_count),
            },
            reviews: post.reviews.iter().map(ReviewDocument::from).collect(),
        }
    }
}

impl TryFrom<ArtPostDocument> for ArtPost {
    type Error = RepoError;

    fn try_from(doc: ArtPostDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&doc.id)?,
            post_date: doc.post_date,
            poster_name: doc.poster_name,
            image_ref: doc.image_ref,
            title: doc.title,
            art_type: doc.art_type,
            description: doc.description,
            subjects: doc.subjects,
            statistics: Statistics {
                review_count: counter(doc.statistics.review_count),
                like_count: counter(doc.statistics.like_count),
            },
            reviews: doc
                .reviews
                .into_iter()
                .map(Review::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}
