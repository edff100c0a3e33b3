//! MongoDB storage.
//!
//! Each art post is one document in the `artposts` collection with its
//! reviews embedded. Every review write is a single `update_one`, so the
//! review list and `statistics.reviewCount` move together without retries.

mod models;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use uuid::Uuid;

use gallery_core::domain::{ArtPost, ArtPostDraft, Review, ReviewDraft};
use gallery_core::error::RepoError;
use gallery_core::ports::{ArtPostRepository, ReviewRepository};
use gallery_core::query::ArtQuery;

use models::{ArtPostDocument, ReviewDocument};

const COLLECTION: &str = "artposts";

/// Connection settings for the document store.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

/// MongoDB art post repository.
pub struct MongoArtPostRepository {
    posts: Collection<ArtPostDocument>,
}

fn mongo_err(e: mongodb::error::Error) -> RepoError {
    match e.kind.as_ref() {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => RepoError::Connection(e.to_string()),
        _ => RepoError::Query(e.to_string()),
    }
}

fn to_bson<T: serde::Serialize>(value: &T) -> Result<Bson, RepoError> {
    bson::to_bson(value).map_err(|e| RepoError::Query(e.to_string()))
}

/// Escape regex metacharacters so a search term matches literally.
pub(crate) fn escape_regex(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if "\\.+*?()|[]{}^$#&-~".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Compile a query into a collection filter.
pub(crate) fn filter_document(query: &ArtQuery) -> Document {
    let mut filter = Document::new();

    if let Some(term) = &query.search {
        let pattern = escape_regex(term);
        filter.insert(
            "$or",
            vec![
                doc! { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "posterName": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }

    if let Some(art_type) = &query.art_type {
        filter.insert("type", art_type.as_str());
    }

    if !query.subjects.is_empty() {
        filter.insert("subjects", doc! { "$all": query.subjects.clone() });
    }

    filter
}

fn newest_first(limit: Option<usize>) -> FindOptions {
    FindOptions::builder()
        .sort(doc! { "postDate": -1, "_id": -1 })
        .limit(limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX)))
        .build()
}

/// `$set` body replacing the editable fields of a post.
fn edit_document(draft: &ArtPostDraft, post_date: Option<DateTime<Utc>>) -> Document {
    let mut set = doc! {
        "posterName": draft.poster_name.as_str(),
        "imageRef": draft.image_ref.as_str(),
        "title": draft.title.as_str(),
        "type": draft.art_type.as_str(),
        "description": draft.description.as_str(),
        "subjects": draft.subjects.clone(),
    };
    if let Some(likes) = draft.like_count {
        set.insert("statistics.likeCount", i64::from(likes));
    }
    if let Some(at) = post_date {
        set.insert("postDate", bson::DateTime::from_chrono(at));
    }
    set
}

/// Pipeline removing one review and decrementing the counter, floored at zero.
fn pull_pipeline(review_id: Uuid) -> Vec<Document> {
    vec![doc! {
        "$set": {
            "reviews": {
                "$filter": {
                    "input": "$reviews",
                    "cond": { "$ne": ["$$this.id", review_id.to_string()] },
                }
            },
            "statistics.reviewCount": {
                "$max": [0, { "$subtract": ["$statistics.reviewCount", 1] }]
            },
        }
    }]
}

impl MongoArtPostRepository {
    pub fn new(posts: Collection<ArtPostDocument>) -> Self {
        Self { posts }
    }

    /// Connect and make sure the collection indexes exist.
    pub async fn connect(config: &MongoConfig) -> Result<Self, RepoError> {
        tracing::info!(database = %config.database, "Initializing document store connection...");

        let client = Client::with_uri_str(&config.url)
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;
        let posts = client
            .database(&config.database)
            .collection::<ArtPostDocument>(COLLECTION);

        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder().keys(doc! { "postDate": -1 }).build(),
            IndexModel::builder().keys(doc! { "reviews.id": 1 }).build(),
        ];
        posts.create_indexes(indexes, None).await.map_err(mongo_err)?;

        tracing::info!("Document store connected");
        Ok(Self::new(posts))
    }

    async fn find_documents(
        &self,
        filter: Document,
        limit: Option<usize>,
    ) -> Result<Vec<ArtPost>, RepoError> {
        let docs: Vec<ArtPostDocument> = self
            .posts
            .find(filter, newest_first(limit))
            .await
            .map_err(mongo_err)?
            .try_collect()
            .await
            .map_err(mongo_err)?;

        docs.into_iter().map(ArtPost::try_from).collect()
    }

    async fn find_document(&self, filter: Document) -> Result<Option<ArtPost>, RepoError> {
        self.posts
            .find_one(filter, None)
            .await
            .map_err(mongo_err)?
            .map(ArtPost::try_from)
            .transpose()
    }
}

#[async_trait]
impl ArtPostRepository for MongoArtPostRepository {
    async fn insert(&self, post: ArtPost) -> Result<ArtPost, RepoError> {
        self.posts
            .insert_one(ArtPostDocument::from(&post), None)
            .await
            .map_err(mongo_err)?;
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ArtPost>, RepoError> {
        self.find_document(doc! { "id": id.to_string() }).await
    }

    async fn find(&self, query: &ArtQuery) -> Result<Vec<ArtPost>, RepoError> {
        self.find_documents(filter_document(query), None).await
    }

    async fn find_others(&self, exclude: Uuid, limit: usize) -> Result<Vec<ArtPost>, RepoError> {
        let filter = doc! { "id": { "$ne": exclude.to_string() } };
        self.find_documents(filter, Some(limit)).await
    }

    async fn update(
        &self,
        id: Uuid,
        draft: &ArtPostDraft,
        post_date: Option<DateTime<Utc>>,
    ) -> Result<(), RepoError> {
        let result = self
            .posts
            .update_one(
                doc! { "id": id.to_string() },
                doc! { "$set": edit_document(draft, post_date) },
                None,
            )
            .await
            .map_err(mongo_err)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = self
            .posts
            .delete_one(doc! { "id": id.to_string() }, None)
            .await
            .map_err(mongo_err)?;

        if result.deleted_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongo"
    }
}

#[async_trait]
impl ReviewRepository for MongoArtPostRepository {
    async fn push_review(&self, art_id: Uuid, review: &Review) -> Result<(), RepoError> {
        let embedded = to_bson(&ReviewDocument::from(review))?;
        let result = self
            .posts
            .update_one(
                doc! { "id": art_id.to_string() },
                doc! {
                    "$push": { "reviews": embedded },
                    "$inc": { "statistics.reviewCount": 1_i64 },
                },
                None,
            )
            .await
            .map_err(mongo_err)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_reviews(&self, art_id: Uuid) -> Result<Vec<Review>, RepoError> {
        self.find_document(doc! { "id": art_id.to_string() })
            .await?
            .map(|post| post.reviews)
            .ok_or(RepoError::NotFound)
    }

    async fn update_review(
        &self,
        review_id: Uuid,
        draft: &ReviewDraft,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let liked = draft.liked_post.map(Bson::Boolean).unwrap_or(Bson::Null);
        let result = self
            .posts
            .update_one(
                doc! { "reviews.id": review_id.to_string() },
                doc! {
                    "$set": {
                        "reviews.$.reviewDate": bson::DateTime::from_chrono(at),
                        "reviews.$.reviewerName": draft.reviewer_name.as_str(),
                        "reviews.$.text": draft.text.as_str(),
                        "reviews.$.likedPost": liked,
                    }
                },
                None,
            )
            .await
            .map_err(mongo_err)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn pull_review(&self, review_id: Uuid) -> Result<(), RepoError> {
        let result = self
            .posts
            .update_one(
                doc! { "reviews.id": review_id.to_string() },
                pull_pipeline(review_id),
                None,
            )
            .await
            .map_err(mongo_err)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn increment_likes(&self, art_id: Uuid) -> Result<(), RepoError> {
        let result = self
            .posts
            .update_one(
                doc! { "id": art_id.to_string() },
                doc! { "$inc": { "statistics.likeCount": 1_i64 } },
                None,
            )
            .await
            .map_err(mongo_err)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
